//! Contract with the chess library that owns rules and search.
//!
//! The session never looks inside a live game. It asks for legal
//! destinations, applies already-validated moves, exports snapshots and asks
//! for an AI reply. Anything that can implement these operations can sit
//! behind the session.

use shakmaty::Square;
use thiserror::Error;

use crate::domain::ai_config::AiConfig;
use crate::domain::chess::MovePair;
use crate::domain::snapshot::BoardSnapshot;

#[derive(Error, Debug)]
pub enum FacadeError {
    /// The caller asked for a move the position does not allow
    #[error("illegal move {from}{to}")]
    IllegalMove { from: Square, to: Square },

    /// A snapshot could not be turned back into a live game
    #[error("invalid position {fen:?}: {reason}")]
    InvalidPosition { fen: String, reason: String },

    /// Search was requested where no legal move exists
    #[error("no legal move in position {fen:?}")]
    NoLegalMove { fen: String },

    /// The search back end failed to produce a move
    #[error("search failed: {0}")]
    Search(String),
}

/// A move that has been applied to a live game
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PlayedMove {
    pub pair: MovePair,
    /// Standard algebraic notation with check/mate suffix
    pub san: String,
}

/// The engine's reply and the position it produced
#[derive(Clone, Debug)]
pub struct AiReply {
    pub played: PlayedMove,
    pub snapshot: BoardSnapshot,
}

/// Builds live games from snapshots.
///
/// A new live game is constructed on every reset and rollback; it is never
/// rewound in place.
pub trait GameFactory {
    type Game: LiveGame;

    /// Construct a game at `snapshot`, or the standard start position.
    fn construct(&self, snapshot: Option<&BoardSnapshot>) -> Result<Self::Game, FacadeError>;
}

/// The mutable game object owned by a session.
pub trait LiveGame: Send + 'static {
    /// Destinations for the piece on `square`; empty when nothing can move.
    fn legal_moves(&self, square: Square) -> Vec<Square>;

    /// Apply a move. Fails only for moves that are not legal.
    fn apply_move(&mut self, from: Square, to: Square) -> Result<PlayedMove, FacadeError>;

    fn export_snapshot(&self) -> BoardSnapshot;

    /// Run one blocking search for the side to move and apply its result.
    fn run_ai(&mut self, config: &AiConfig) -> Result<AiReply, FacadeError>;
}
