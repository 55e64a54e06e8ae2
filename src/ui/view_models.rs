//! View models for rendering the move history.
//!
//! These types are DTOs (Data Transfer Objects) that prepare game state
//! for display in the UI. They live in the UI layer, not the domain layer.

/// Display data for one move in the history
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryMoveDisplay {
    /// Ply the entry restores when clicked
    pub ply: usize,
    pub move_num: usize,
    pub is_black: bool,
    /// SAN including any check/mate suffix
    pub san: String,
    /// Whether the move was played by the engine
    pub by_engine: bool,
}

/// One numbered row: the White move and the Black reply, if any
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryRowDisplay {
    pub move_num: usize,
    pub white: Option<HistoryMoveDisplay>,
    pub black: Option<HistoryMoveDisplay>,
}
