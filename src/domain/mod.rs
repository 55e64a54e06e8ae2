//! Pure game logic: no GPUI, no processes.

pub mod ai_config;
pub mod chess;
pub mod facade;
pub mod history;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod uci;

pub use ai_config::{AiConfig, AiConfigError, AiLevel, SearchParams};
pub use chess::{ENGINE_SIDE, HUMAN_SIDE, MovePair, to_row_col, to_square};
pub use history::History;
pub use session::{MoveOutcome, RollbackOutcome, Session, SessionError, Status};
pub use snapshot::BoardSnapshot;
