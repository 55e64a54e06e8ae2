//! Theme constants and colors for the chess UI.

use gpui::{Rgba, rgb};

// Layout constants
pub const BOARD_PADDING: f32 = 20.0;
pub const PIECE_SCALE: f32 = 0.98; // piece size relative to square
pub const DESTINATION_DOT_SCALE: f32 = 0.3;

// Initial panel sizes
pub const INITIAL_LEFT_PANEL: f32 = 560.0;
pub const INITIAL_RIGHT_PANEL: f32 = 340.0;

// Board colors
pub const LIGHT_SQUARE: u32 = 0xEFD9B5;
pub const DARK_SQUARE: u32 = 0xB48764;
pub const SELECTED_SQUARE: u32 = 0x7fa650;
pub const LAST_MOVE_LIGHT: u32 = 0xF6EB72;
pub const LAST_MOVE_DARK: u32 = 0xDCC34B;
pub const CHECK_SQUARE: u32 = 0xE55B4D;
pub const DESTINATION_DOT: u32 = 0x3a5a2a;

// Panel colors
pub const PANEL_BG: u32 = 0x2a2a2a;
pub const MOVE_LIST_BG: u32 = 0x1e1e1e;
pub const BORDER_COLOR: u32 = 0x4a4a4a;
pub const TEXT_PRIMARY: u32 = 0xffffff;
pub const TEXT_SECONDARY: u32 = 0x888888;
pub const TEXT_WARNING: u32 = 0xfbbf24;
pub const TEXT_ERROR: u32 = 0xf87171;

fn is_light(row: usize, col: usize) -> bool {
    (row + col) % 2 == 0
}

/// Get the color for a board square based on its position
pub fn square_color(row: usize, col: usize) -> Rgba {
    if is_light(row, col) {
        rgb(LIGHT_SQUARE)
    } else {
        rgb(DARK_SQUARE)
    }
}

/// Square color when it is part of the last move
pub fn last_move_color(row: usize, col: usize) -> Rgba {
    if is_light(row, col) {
        rgb(LAST_MOVE_LIGHT)
    } else {
        rgb(LAST_MOVE_DARK)
    }
}
