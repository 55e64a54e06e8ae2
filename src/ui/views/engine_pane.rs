//! AI pane - status, difficulty controls and the last search.

use gpui::{App, Div, Entity, SharedString, div, prelude::*, px, rgb};
use gpui_component::button::{Button, ButtonVariants};
use shakmaty::Color;

use crate::domain::uci::{Score, UciInfo};
use crate::domain::{AiConfig, AiLevel, ENGINE_SIDE, SearchParams, Status};
use crate::models::{GameModel, SearchReport};
use crate::ui::theme::{
    BOARD_PADDING, BORDER_COLOR, MOVE_LIST_BG, PANEL_BG, TEXT_ERROR, TEXT_PRIMARY,
    TEXT_SECONDARY, TEXT_WARNING,
};

// Colors for evaluation display
const EVAL_POSITIVE: u32 = 0x4ade80; // green - white advantage
const EVAL_NEGATIVE: u32 = 0xf87171; // red - black advantage
const EVAL_NEUTRAL: u32 = 0xa1a1aa; // gray - equal

/// One row of the custom parameter editor
struct Stepper {
    id: &'static str,
    label: &'static str,
    value: String,
    decrease: fn(&mut SearchParams),
    increase: fn(&mut SearchParams),
}

/// Render the AI pane.
pub fn render_ai_pane(model: &Entity<GameModel>, cx: &App) -> impl IntoElement {
    let game = model.read(cx);
    let status = game.status().clone();
    let config = *game.ai_config();
    let params = config.params();
    let engine_name = game.engine_name().to_string();
    let can_retry = game.can_retry();
    let error = game.error().map(str::to_string);
    let last_search = game.last_search().cloned();

    let status_color = match &status {
        Status::Thinking => TEXT_WARNING,
        Status::EngineFailed(_) => TEXT_ERROR,
        Status::Checkmate { .. } | Status::Stalemate => TEXT_WARNING,
        _ => TEXT_PRIMARY,
    };

    let model_new = model.clone();
    let new_game_button = Button::new("new-game")
        .label("New Game")
        .primary()
        .compact()
        .on_click(move |_, _, cx| {
            model_new.update(cx, |game, cx| game.new_game(cx));
        });

    let model_retry = model.clone();
    let retry_button = can_retry.then(|| {
        Button::new("retry-engine")
            .label("Retry")
            .danger()
            .compact()
            .on_click(move |_, _, cx| {
                model_retry.update(cx, |game, cx| game.retry_ai(cx));
            })
    });

    let header = div()
        .flex_shrink_0()
        .flex()
        .items_center()
        .justify_between()
        .px_4()
        .py_2()
        .border_b_1()
        .border_color(rgb(BORDER_COLOR))
        .child(
            div()
                .flex()
                .items_center()
                .gap_2()
                .child(
                    div()
                        .text_color(rgb(TEXT_PRIMARY))
                        .font_weight(gpui::FontWeight::SEMIBOLD)
                        .child("Engine"),
                )
                .child(
                    div()
                        .text_xs()
                        .text_color(rgb(TEXT_SECONDARY))
                        .child(engine_name),
                ),
        )
        .child(
            div()
                .flex()
                .gap_2()
                .when_some(retry_button, |el, b| el.child(b))
                .child(new_game_button),
        );

    let status_section = div()
        .flex_shrink_0()
        .flex()
        .flex_col()
        .gap_1()
        .px_4()
        .py_2()
        .border_b_1()
        .border_color(rgb(BORDER_COLOR))
        .child(
            div()
                .text_sm()
                .text_color(rgb(status_color))
                .child(status.to_string()),
        )
        .when_some(error, |el, e| {
            el.child(div().text_xs().text_color(rgb(TEXT_ERROR)).child(e))
        });

    let engine_pane = div()
        .flex()
        .flex_col()
        .bg(rgb(MOVE_LIST_BG))
        .border_1()
        .border_color(rgb(BORDER_COLOR))
        .rounded_md()
        .overflow_hidden()
        .child(header)
        .child(status_section)
        .child(render_level_section(model, &config))
        .child(render_custom_section(model, &config, &params))
        .child(render_last_search(last_search.as_ref()));

    div()
        .w_full()
        .flex()
        .flex_col()
        .bg(rgb(PANEL_BG))
        .p(px(BOARD_PADDING))
        .child(engine_pane)
}

/// Preset level buttons
fn render_level_section(model: &Entity<GameModel>, config: &AiConfig) -> Div {
    let active = match config {
        AiConfig::Level { level } => Some(*level),
        AiConfig::Custom(_) => None,
    };

    let buttons = AiLevel::all().map(|level| {
        let model = model.clone();
        let button = Button::new(SharedString::from(format!("ai-level-{}", level.get())))
            .label(level.get().to_string())
            .compact();
        let button = if active == Some(level) {
            button.primary()
        } else {
            button
        };
        button.on_click(move |_, _, cx| {
            model.update(cx, |game, cx| {
                game.set_ai_config(AiConfig::Level { level }, cx)
            });
        })
    });

    div()
        .flex_shrink_0()
        .flex()
        .items_center()
        .gap_2()
        .px_4()
        .py_2()
        .border_b_1()
        .border_color(rgb(BORDER_COLOR))
        .child(
            div()
                .w(px(60.))
                .text_xs()
                .text_color(rgb(TEXT_SECONDARY))
                .child("Level"),
        )
        .children(buttons)
        .when(active.is_none(), |el| {
            el.child(div().text_xs().text_color(rgb(TEXT_WARNING)).child("custom"))
        })
}

/// Steppers for the custom search parameters
fn render_custom_section(
    model: &Entity<GameModel>,
    config: &AiConfig,
    params: &SearchParams,
) -> Div {
    let steppers = [
        Stepper {
            id: "depth",
            label: "Depth",
            value: params.depth.to_string(),
            decrease: |p| p.depth = p.depth.saturating_sub(1),
            increase: |p| p.depth += 1,
        },
        Stepper {
            id: "extended",
            label: "Extended",
            value: params.extended_depth.to_string(),
            decrease: |p| p.extended_depth = p.extended_depth.saturating_sub(1),
            increase: |p| p.extended_depth += 1,
        },
        Stepper {
            id: "quiescence",
            label: "Quiescence",
            value: params.quiescence_depth.to_string(),
            decrease: |p| p.quiescence_depth = p.quiescence_depth.saturating_sub(1),
            increase: |p| p.quiescence_depth += 1,
        },
        Stepper {
            id: "memory",
            label: "Memory",
            value: format!("{} MB", params.memory_mb),
            decrease: |p| p.memory_mb /= 2,
            increase: |p| p.memory_mb = p.memory_mb.saturating_mul(2),
        },
        Stepper {
            id: "randomness",
            label: "Random",
            value: format!("{} cp", params.randomness),
            decrease: |p| p.randomness = p.randomness.saturating_sub(10),
            increase: |p| p.randomness += 10,
        },
    ];

    let model_check = model.clone();
    let check_extension = params.check_extension;
    let check_button = Button::new("ai-check-extension")
        .label(if check_extension { "on" } else { "off" })
        .compact()
        .on_click(move |_, _, cx| {
            model_check.update(cx, |game, cx| {
                game.adjust_params(|p| p.check_extension = !p.check_extension, cx)
            });
        });

    div()
        .flex_shrink_0()
        .flex()
        .flex_col()
        .gap_1()
        .px_4()
        .py_2()
        .border_b_1()
        .border_color(rgb(BORDER_COLOR))
        .child(
            div()
                .text_xs()
                .text_color(rgb(if config.is_custom() {
                    TEXT_PRIMARY
                } else {
                    TEXT_SECONDARY
                }))
                .child("Search parameters"),
        )
        .children(
            steppers
                .into_iter()
                .map(|stepper| render_stepper(model, stepper)),
        )
        .child(render_param_row("Check ext.", check_button))
}

fn render_stepper(model: &Entity<GameModel>, stepper: Stepper) -> Div {
    let model_dec = model.clone();
    let model_inc = model.clone();
    let decrease = stepper.decrease;
    let increase = stepper.increase;

    let controls = div()
        .flex()
        .items_center()
        .gap_2()
        .child(
            Button::new(SharedString::from(format!("ai-{}-dec", stepper.id)))
                .label("-")
                .compact()
                .on_click(move |_, _, cx| {
                    model_dec.update(cx, |game, cx| game.adjust_params(decrease, cx));
                }),
        )
        .child(
            div()
                .w(px(64.))
                .text_sm()
                .text_color(rgb(TEXT_PRIMARY))
                .child(stepper.value),
        )
        .child(
            Button::new(SharedString::from(format!("ai-{}-inc", stepper.id)))
                .label("+")
                .compact()
                .on_click(move |_, _, cx| {
                    model_inc.update(cx, |game, cx| game.adjust_params(increase, cx));
                }),
        );

    render_param_row(stepper.label, controls)
}

fn render_param_row(label: &'static str, control: impl IntoElement) -> Div {
    div()
        .flex()
        .items_center()
        .justify_between()
        .child(
            div()
                .text_xs()
                .text_color(rgb(TEXT_SECONDARY))
                .child(label),
        )
        .child(control)
}

/// The principal variations of the last engine move
fn render_last_search(report: Option<&SearchReport>) -> Div {
    let section = div().flex_shrink_0().px_4().py_3();
    let Some(report) = report else {
        return section.child(
            div()
                .text_color(rgb(TEXT_SECONDARY))
                .text_sm()
                .child("No engine move yet"),
        );
    };

    let black_to_move = ENGINE_SIDE == Color::Black;
    let summary = format!(
        "{} answered in {} ms",
        report.engine,
        report.elapsed.as_millis()
    );

    section
        .flex()
        .flex_col()
        .gap_2()
        .child(
            div()
                .text_xs()
                .text_color(rgb(TEXT_SECONDARY))
                .child(summary),
        )
        .children(
            report
                .lines
                .iter()
                .enumerate()
                .map(|(i, info)| render_pv_line(info, i == 0, black_to_move)),
        )
}

/// Render a single PV line
fn render_pv_line(info: &UciInfo, is_best: bool, black_to_move: bool) -> Div {
    let (eval_text, eval_color) = format_evaluation(info.score, black_to_move);
    let pv_text = format_pv(&info.pv);

    let row = div()
        .flex()
        .items_center()
        .gap_2()
        .child(
            div()
                .w(px(60.))
                .text_sm()
                .font_weight(if is_best {
                    gpui::FontWeight::BOLD
                } else {
                    gpui::FontWeight::NORMAL
                })
                .text_color(rgb(eval_color))
                .child(eval_text),
        )
        .child(
            div()
                .flex_1()
                .text_xs()
                .text_color(rgb(if is_best { TEXT_PRIMARY } else { TEXT_SECONDARY }))
                .overflow_hidden()
                .text_ellipsis()
                .child(pv_text),
        );

    if is_best {
        row.child(
            div()
                .text_xs()
                .text_color(rgb(TEXT_SECONDARY))
                .child(format!(
                    "d{} {}",
                    format_depth(info.depth, info.seldepth),
                    format_stats(info)
                )),
        )
    } else {
        row
    }
}

/// Format the evaluation score for display (always from white's perspective)
fn format_evaluation(score: Option<Score>, black_to_move: bool) -> (String, u32) {
    match score {
        Some(Score::Centipawns(cp)) => {
            // engine scores are from the side to move
            let white_cp = if black_to_move { -cp } else { cp };
            let color = if white_cp > 50 {
                EVAL_POSITIVE
            } else if white_cp < -50 {
                EVAL_NEGATIVE
            } else {
                EVAL_NEUTRAL
            };
            (Score::Centipawns(white_cp).display(), color)
        }
        Some(Score::Mate(moves)) => {
            let white_mate = if black_to_move { -moves } else { moves };
            let color = if white_mate > 0 {
                EVAL_POSITIVE
            } else {
                EVAL_NEGATIVE
            };
            (Score::Mate(white_mate).display(), color)
        }
        None => ("--".to_string(), EVAL_NEUTRAL),
    }
}

/// Format depth for display
fn format_depth(depth: Option<u32>, seldepth: Option<u32>) -> String {
    match (depth, seldepth) {
        (Some(d), Some(sd)) => format!("{}/{}", d, sd),
        (Some(d), None) => format!("{}", d),
        _ => "--".to_string(),
    }
}

/// Format the principal variation for display
fn format_pv(pv: &[String]) -> String {
    if pv.is_empty() {
        return "...".to_string();
    }

    let display_moves: Vec<&str> = pv.iter().take(8).map(|s| s.as_str()).collect();
    let mut result = display_moves.join(" ");

    if pv.len() > 8 {
        result.push_str(" ...");
    }

    result
}

/// Format search statistics
fn format_stats(info: &UciInfo) -> String {
    let mut parts = Vec::new();

    if let Some(nodes) = info.nodes {
        parts.push(format_nodes(nodes));
    }

    if let Some(nps) = info.nps {
        parts.push(format!("{}/s", format_nodes(nps)));
    }

    if let Some(ms) = info.time {
        parts.push(format!("{:.1}s", ms as f64 / 1000.0));
    }

    // hashfull is reported in permille
    if let Some(hashfull) = info.hashfull {
        parts.push(format!("hash {}%", hashfull / 10));
    }

    parts.join(" | ")
}

/// Format large numbers with K/M/B suffixes
fn format_nodes(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.1}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{}", n)
    }
}
