//! Piece rendering component.

use gpui::{div, img, prelude::*, px};
use shakmaty::{Color, Piece, Role};

/// Asset path of the SVG for `piece`
pub fn piece_svg_path(piece: Piece) -> &'static str {
    match (piece.role, piece.color) {
        (Role::Pawn, Color::White) => "assets/pawn-white.svg",
        (Role::Pawn, Color::Black) => "assets/pawn-black.svg",
        (Role::Rook, Color::White) => "assets/rook-white.svg",
        (Role::Rook, Color::Black) => "assets/rook-black.svg",
        (Role::Knight, Color::White) => "assets/knight-white.svg",
        (Role::Knight, Color::Black) => "assets/knight-black.svg",
        (Role::Bishop, Color::White) => "assets/bishop-white.svg",
        (Role::Bishop, Color::Black) => "assets/bishop-black.svg",
        (Role::Queen, Color::White) => "assets/queen-white.svg",
        (Role::Queen, Color::Black) => "assets/queen-black.svg",
        (Role::King, Color::White) => "assets/king-white.svg",
        (Role::King, Color::Black) => "assets/king-black.svg",
    }
}

/// Render a chess piece centered in its container
pub fn render_piece(piece: Piece, piece_size: f32) -> impl IntoElement {
    div()
        .size_full()
        .flex()
        .items_center()
        .justify_center()
        .child(img(piece_svg_path(piece)).size(px(piece_size)))
}
