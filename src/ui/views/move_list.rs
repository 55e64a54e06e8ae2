//! History panel - the numbered move list with rollback on click.

use gpui::{App, Div, Entity, SharedString, div, prelude::*, px, rgb};

use crate::models::GameModel;
use crate::ui::display::history_rows;
use crate::ui::theme::{
    BOARD_PADDING, BORDER_COLOR, MOVE_LIST_BG, PANEL_BG, TEXT_PRIMARY, TEXT_SECONDARY,
};
use crate::ui::view_models::HistoryMoveDisplay;

// Colors for move highlighting
const MOVE_HOVER_BG: u32 = 0x3a3a3a;
const MOVE_SELECTED_BG: u32 = 0x4a6da7;
const ENGINE_MOVE_TEXT: u32 = 0x9ec5fe;
const NAV_BUTTON_BG: u32 = 0x3a3a3a;
const NAV_BUTTON_HOVER_BG: u32 = 0x4a4a4a;
const NAV_BUTTON_DISABLED: u32 = 0x555555;

/// Render the history panel for a given game model.
pub fn render_history_panel(model: &Entity<GameModel>, cx: &App) -> Div {
    let game = model.read(cx);
    let history = game.history();
    let rows = history_rows(history);
    let current_ply = game.current_ply();
    let can_navigate = !game.is_thinking();
    let can_go_back = can_navigate && current_ply > 0;
    let can_go_forward = can_navigate && !history.is_at_end();

    // Clone model for navigation closures
    let model_start = model.clone();
    let model_back = model.clone();
    let model_forward = model.clone();
    let model_end = model.clone();

    let start_entry = render_clickable_move(
        0,
        SharedString::from(history.root().label.clone()),
        current_ply == 0,
        false,
        can_navigate,
        model.clone(),
    );

    let moves_content = div()
        .flex()
        .flex_col()
        .gap_1()
        .child(start_entry)
        .children(rows.into_iter().map(|row| {
            div()
                .flex()
                .items_center()
                .gap_2()
                .child(
                    div()
                        .w(px(36.))
                        .text_color(rgb(TEXT_SECONDARY))
                        .child(format!("{}.", row.move_num)),
                )
                .child(render_move_cell(row.white, current_ply, can_navigate, model))
                .child(render_move_cell(row.black, current_ply, can_navigate, model))
        }));

    let move_list = div()
        .size_full()
        .flex()
        .flex_col()
        .bg(rgb(MOVE_LIST_BG))
        .border_1()
        .border_color(rgb(BORDER_COLOR))
        .rounded_md()
        .overflow_hidden()
        // Header (fixed)
        .child(
            div()
                .p_4()
                .pb_2()
                .text_color(rgb(TEXT_PRIMARY))
                .border_b_1()
                .border_color(rgb(BORDER_COLOR))
                .child("Move History"),
        )
        // Scrollable moves content
        .child(
            div()
                .id("move-list-scroll")
                .flex_1()
                .overflow_y_scroll()
                .p_4()
                .pt_2()
                .child(moves_content),
        )
        // Navigation buttons at bottom
        .child(
            div()
                .flex()
                .items_center()
                .justify_center()
                .gap_2()
                .p_3()
                .border_t_1()
                .border_color(rgb(BORDER_COLOR))
                .child(render_nav_button("⟨⟨", can_go_back, move |cx| {
                    model_start.update(cx, |game, cx| game.go_to_start(cx));
                }))
                .child(render_nav_button("⟨", can_go_back, move |cx| {
                    model_back.update(cx, |game, cx| game.step_back(cx));
                }))
                .child(render_nav_button("⟩", can_go_forward, move |cx| {
                    model_forward.update(cx, |game, cx| game.step_forward(cx));
                }))
                .child(render_nav_button("⟩⟩", can_go_forward, move |cx| {
                    model_end.update(cx, |game, cx| game.go_to_end(cx));
                })),
        );

    div()
        .size_full()
        .flex()
        .flex_col()
        .bg(rgb(PANEL_BG))
        .p(px(BOARD_PADDING))
        .pb_0()
        .child(move_list)
}

/// One half of a history row; empty space when the move doesn't exist
fn render_move_cell(
    mv: Option<HistoryMoveDisplay>,
    current_ply: usize,
    enabled: bool,
    model: &Entity<GameModel>,
) -> Div {
    let cell = div().flex_1();
    match mv {
        Some(mv) => cell.child(render_clickable_move(
            mv.ply,
            SharedString::from(mv.san),
            mv.ply == current_ply,
            mv.by_engine,
            enabled,
            model.clone(),
        )),
        None => cell,
    }
}

/// Render a clickable move that rolls the game back to its ply; engine
/// replies are tinted.
fn render_clickable_move(
    ply: usize,
    label: SharedString,
    is_selected: bool,
    by_engine: bool,
    enabled: bool,
    model: Entity<GameModel>,
) -> impl IntoElement {
    div()
        .id(SharedString::from(format!("history-ply-{}", ply)))
        .px_1()
        .rounded(px(3.0))
        .text_color(rgb(if by_engine && !is_selected {
            ENGINE_MOVE_TEXT
        } else {
            TEXT_PRIMARY
        }))
        .when(is_selected, |el| el.bg(rgb(MOVE_SELECTED_BG)))
        .when(enabled && !is_selected, |el| {
            el.cursor_pointer()
                .hover(|s| s.bg(rgb(MOVE_HOVER_BG)))
                .on_click(move |_ev, _window, cx| {
                    model.update(cx, |game, cx| game.rollback(ply, cx));
                })
        })
        .child(label)
}

/// Render a navigation button
fn render_nav_button(
    label: &'static str,
    enabled: bool,
    on_click: impl Fn(&mut App) + 'static,
) -> impl IntoElement {
    div()
        .id(SharedString::from(format!("nav-{}", label)))
        .px_4()
        .py_2()
        .rounded(px(4.0))
        .text_color(if enabled {
            rgb(TEXT_PRIMARY)
        } else {
            rgb(NAV_BUTTON_DISABLED)
        })
        .font_weight(gpui::FontWeight::BOLD)
        .when(enabled, |el| {
            el.bg(rgb(NAV_BUTTON_BG))
                .cursor_pointer()
                .hover(|s| s.bg(rgb(NAV_BUTTON_HOVER_BG)))
                .on_click(move |_ev, _window, cx| {
                    on_click(cx);
                })
        })
        .when(!enabled, |el| el.bg(rgb(PANEL_BG)))
        .child(label)
}
