//! Chess board view - the main board with click-to-move.

use gpui::{
    Context, Entity, MouseButton, MouseDownEvent, Pixels, Subscription, Window, canvas, div,
    prelude::*, px, rgb,
};
use gpui_component::resizable::{h_resizable, resizable_panel};

use crate::domain::{to_row_col, to_square};
use crate::models::GameModel;
use crate::ui::components::{SquareMarks, render_square};
use crate::ui::theme::{BOARD_PADDING, INITIAL_LEFT_PANEL, INITIAL_RIGHT_PANEL, PANEL_BG};
use crate::ui::views::{render_ai_pane, render_history_panel};

/// The main chess board view that observes a GameModel
pub struct ChessBoardView {
    model: Entity<GameModel>,
    _subscription: Subscription,
}

impl ChessBoardView {
    pub fn new(model: Entity<GameModel>, cx: &mut Context<Self>) -> Self {
        let _subscription = cx.observe(&model, |_, _, cx| cx.notify());
        Self {
            model,
            _subscription,
        }
    }
}

/// Highlights for every square, indexed `row * 8 + col`
fn square_marks(game: &GameModel) -> [SquareMarks; 64] {
    let mut marks = [SquareMarks::default(); 64];
    let index = |(row, col): (usize, usize)| row * 8 + col;

    if let Some(selection) = game.selection() {
        marks[index(to_row_col(selection.origin))].selected = true;
        for &sq in &selection.destinations {
            marks[index(to_row_col(sq))].destination = true;
        }
    }
    if let Some(last) = game.last_move() {
        for (idx, mark) in marks.iter_mut().enumerate() {
            mark.last_move = last.touches(to_square(idx / 8, idx % 8));
        }
    }

    let snapshot = game.snapshot();
    if snapshot.is_check() {
        if let Some(king) = snapshot.board().king_of(snapshot.turn()) {
            marks[index(to_row_col(king))].in_check = true;
        }
    }
    marks
}

impl Render for ChessBoardView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let model = self.model.clone();
        let model_down = model.clone();
        let model_measure = model.clone();

        let game = self.model.read(cx);
        let layout = game.layout();
        let square_size = layout.square_size();
        let piece_size = layout.piece_size();
        let board_total_size = layout.board_total_size();
        let marks = square_marks(game);

        // Collect pieces for rendering (can't borrow game in closure)
        let snapshot = game.snapshot();
        let pieces: Vec<_> = (0..64)
            .map(|idx| snapshot.piece_at(to_square(idx / 8, idx % 8)))
            .collect();

        let board = div()
            .flex_shrink_0()
            .flex()
            .flex_col()
            .w(px(board_total_size))
            .h(px(board_total_size))
            .overflow_hidden()
            .rounded_md()
            .children((0..8).map(|row| {
                div().flex().flex_shrink_0().children((0..8).map(|col| {
                    let idx = row * 8 + col;
                    render_square(row, col, pieces[idx], marks[idx], square_size, piece_size)
                }))
            }));

        let board_panel_content = div()
            .id("board-panel")
            .relative()
            .size_full()
            .overflow_hidden()
            .bg(rgb(PANEL_BG))
            .p(px(BOARD_PADDING))
            .child(board)
            .on_mouse_down(
                MouseButton::Left,
                move |ev: &MouseDownEvent, _window, cx| {
                    model_down.update(cx, |game, cx| {
                        let pos = ev.position;
                        if let Some((row, col)) =
                            game.layout().pos_to_square(pos.x.into(), pos.y.into())
                        {
                            game.click_square(row, col, cx);
                        }
                    });
                },
            );

        // Canvas to measure actual panel size
        let measure_canvas = canvas(
            move |bounds, _window, cx| {
                model_measure.update(cx, |game, cx| {
                    if game.panel_size != bounds.size {
                        game.panel_size = bounds.size;
                        cx.notify();
                    }
                });
            },
            |_, _, _, _| {},
        )
        .absolute()
        .top_0()
        .left_0()
        .size_full();

        let board_panel_with_measure = div()
            .relative()
            .size_full()
            .child(measure_canvas)
            .child(board_panel_content);

        let side_panel = div()
            .size_full()
            .flex()
            .flex_col()
            .bg(rgb(PANEL_BG))
            .child(div().flex_1().min_h_0().child(render_history_panel(&model, cx)))
            .child(div().flex_shrink_0().child(render_ai_pane(&model, cx)));

        // Main resizable layout
        div().size_full().font_family("Berkeley Mono").child(
            h_resizable("chess-layout")
                .child(
                    resizable_panel()
                        .size(px(INITIAL_LEFT_PANEL))
                        .size_range(px(320.)..px(1200.))
                        .child(board_panel_with_measure),
                )
                .child(
                    resizable_panel()
                        .size(px(INITIAL_RIGHT_PANEL))
                        .size_range(px(240.)..Pixels::MAX)
                        .child(side_panel),
                ),
        )
    }
}
