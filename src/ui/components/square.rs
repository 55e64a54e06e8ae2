//! Square rendering component.

use gpui::{div, prelude::*, px, rgb};
use shakmaty::Piece;

use crate::ui::components::render_piece;
use crate::ui::theme::{
    CHECK_SQUARE, DESTINATION_DOT, DESTINATION_DOT_SCALE, SELECTED_SQUARE, last_move_color,
    square_color,
};

/// Highlights drawn on a square
#[derive(Clone, Copy, Default, Debug)]
pub struct SquareMarks {
    pub selected: bool,
    /// A legal destination of the selected piece
    pub destination: bool,
    /// Origin or destination of the last move
    pub last_move: bool,
    /// The king of the side in check
    pub in_check: bool,
}

/// Render a single board square with optional piece
pub fn render_square(
    row: usize,
    col: usize,
    piece: Option<Piece>,
    marks: SquareMarks,
    square_size: f32,
    piece_size: f32,
) -> impl IntoElement {
    let background = if marks.in_check {
        rgb(CHECK_SQUARE)
    } else if marks.selected {
        rgb(SELECTED_SQUARE)
    } else if marks.last_move {
        last_move_color(row, col)
    } else {
        square_color(row, col)
    };

    let dot_size = square_size * DESTINATION_DOT_SCALE;

    div()
        .flex_shrink_0() // never shrink - maintain aspect ratio
        .relative()
        .size(px(square_size))
        .bg(background)
        .flex()
        .items_center()
        .justify_center()
        .when_some(piece, |el, p| el.child(render_piece(p, piece_size)))
        .when(marks.destination, |el| {
            el.child(
                div()
                    .absolute()
                    .top(px((square_size - dot_size) / 2.0))
                    .left(px((square_size - dot_size) / 2.0))
                    .size(px(dot_size))
                    .rounded_full()
                    .opacity(0.6)
                    .bg(rgb(DESTINATION_DOT)),
            )
        })
}
