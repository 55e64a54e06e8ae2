//! Rules and search back ends behind the game facade.

mod random_mover;
mod shakmaty_game;
mod uci_searcher;

pub use random_mover::RandomMover;
pub use shakmaty_game::{ShakmatyFactory, ShakmatyGame};
pub use uci_searcher::UciSearcher;

use shakmaty::{Chess, Move};

use crate::domain::ai_config::SearchParams;
use crate::domain::facade::FacadeError;
use crate::domain::uci::UciInfo;

/// Chooses a move for the side to move.
///
/// Implementations block until a move is found; the caller decides which
/// thread that happens on.
pub trait Searcher: Send + Sync {
    fn name(&self) -> &str;

    fn choose_move(&self, position: &Chess, params: &SearchParams) -> Result<Move, FacadeError>;

    /// Principal variations of the last finished search, best first
    fn last_analysis(&self) -> Vec<UciInfo> {
        Vec::new()
    }
}
