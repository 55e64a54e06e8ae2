mod piece;
mod square;

pub use piece::{piece_svg_path, render_piece};
pub use square::{SquareMarks, render_square};
