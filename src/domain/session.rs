//! The game session: move/turn controller, AI scheduling and rollback.
//!
//! A [`Session`] owns the one live game, the history log and all state the
//! board shows (selection, status, last move). Every UI event maps to one
//! method call; none of them need a rendering surface.

use std::fmt;

use shakmaty::{Color, Role, Square};
use thiserror::Error;

use crate::domain::ai_config::{AiConfig, AiConfigError};
use crate::domain::chess::{ENGINE_SIDE, HUMAN_SIDE, MovePair, castle_king_destination};
use crate::domain::facade::{FacadeError, GameFactory, LiveGame};
use crate::domain::history::{History, HistoryEntry};
use crate::domain::scheduler::{AiCompletion, AiJob};
use crate::domain::snapshot::BoardSnapshot;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Facade(#[from] FacadeError),

    #[error("start position must have White to move")]
    EngineToMoveAtStart,

    #[error("start position has no legal move")]
    TerminalStart,
}

/// Where the AI invocation stands
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// No search outstanding
    Idle,
    /// A search is due; the UI gets to render before it starts
    Queued,
    /// The live game is lent to a running [`AiJob`]
    Searching,
}

/// Status line shown under the board
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Status {
    Normal { to_move: Color },
    Check { to_move: Color },
    Thinking,
    Checkmate { winner: Color },
    Stalemate,
    EngineFailed(String),
}

impl Status {
    fn from_snapshot(snapshot: &BoardSnapshot) -> Self {
        let to_move = snapshot.turn();
        if snapshot.is_checkmate() {
            Status::Checkmate { winner: !to_move }
        } else if snapshot.is_stalemate() {
            Status::Stalemate
        } else if snapshot.is_check() {
            Status::Check { to_move }
        } else {
            Status::Normal { to_move }
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, Status::Checkmate { .. } | Status::Stalemate)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Normal { to_move } => write!(f, "{} to move", side_name(*to_move)),
            Status::Check { to_move } => write!(f, "{} is in check", side_name(*to_move)),
            Status::Thinking => f.write_str("Engine is thinking..."),
            Status::Checkmate { winner } => write!(f, "Checkmate - {} wins", side_name(*winner)),
            Status::Stalemate => f.write_str("Stalemate - draw"),
            Status::EngineFailed(reason) => write!(f, "Engine failed: {}", reason),
        }
    }
}

fn side_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

/// The selected origin and where it may go
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Selection {
    pub origin: Square,
    pub destinations: Vec<Square>,
}

impl Selection {
    pub fn allows(&self, sq: Square) -> bool {
        self.destinations.contains(&sq)
    }
}

/// What a board click did
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    /// Preconditions failed or nothing to do
    Ignored,
    Selected,
    Deselected,
    Moved { ai_queued: bool },
}

/// What a rollback did
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RollbackOutcome {
    Ignored,
    Restored { ai_queued: bool },
}

/// One game against the engine
pub struct Session<F: GameFactory> {
    factory: F,
    /// Custom start position, if any (None = standard start)
    start: Option<BoardSnapshot>,
    /// The live game; None only while an [`AiJob`] holds it
    game: Option<F::Game>,
    history: History,
    selection: Option<Selection>,
    status: Status,
    phase: Phase,
    ai_config: AiConfig,
    /// Bumped whenever the live game is replaced
    generation: u64,
}

impl<F: GameFactory> Session<F> {
    /// Start a session at `start`, or at the standard start position.
    pub fn new(
        factory: F,
        start: Option<BoardSnapshot>,
        ai_config: AiConfig,
    ) -> Result<Self, SessionError> {
        let game = factory.construct(start.as_ref())?;
        let snapshot = game.export_snapshot();
        if snapshot.turn() != HUMAN_SIDE {
            return Err(SessionError::EngineToMoveAtStart);
        }
        if snapshot.is_terminal() {
            return Err(SessionError::TerminalStart);
        }

        tracing::info!(fen = snapshot.fen(), ai = %ai_config, "session started");
        Ok(Self {
            factory,
            start,
            game: Some(game),
            status: Status::from_snapshot(&snapshot),
            history: History::new(snapshot),
            selection: None,
            phase: Phase::Idle,
            ai_config,
            generation: 0,
        })
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// The position at the pointer
    pub fn current_snapshot(&self) -> &BoardSnapshot {
        &self.history.current().snapshot
    }

    pub fn current_ply(&self) -> usize {
        self.history.current_ply()
    }

    pub fn last_move(&self) -> Option<MovePair> {
        self.history.current().last_move
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ai_in_flight(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn ai_config(&self) -> &AiConfig {
        &self.ai_config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Replace the AI configuration; applies from the next search on.
    pub fn set_ai_config(&mut self, config: AiConfig) -> Result<(), AiConfigError> {
        config.validate()?;
        if config != self.ai_config {
            tracing::info!(ai = %config, "AI configuration changed");
            self.ai_config = config;
        }
        Ok(())
    }

    /// Handle a click on `square`.
    pub fn attempt_move(&mut self, square: Square) -> Result<MoveOutcome, SessionError> {
        if self.is_ai_in_flight() || self.status.is_game_over() {
            return Ok(MoveOutcome::Ignored);
        }
        if self.current_snapshot().turn() != HUMAN_SIDE {
            return Ok(MoveOutcome::Ignored);
        }

        let Some(selection) = self.selection.take() else {
            return Ok(self.select(square));
        };

        let target = self.effective_destination(&selection, square);
        if selection.allows(target) {
            return self.play_human(selection.origin, target);
        }
        if square != selection.origin && self.current_snapshot().is_owned_by(square, HUMAN_SIDE) {
            return Ok(self.select(square));
        }
        Ok(MoveOutcome::Deselected)
    }

    fn select(&mut self, square: Square) -> MoveOutcome {
        if !self.current_snapshot().is_owned_by(square, HUMAN_SIDE) {
            return MoveOutcome::Ignored;
        }
        let Some(game) = self.game.as_ref() else {
            return MoveOutcome::Ignored;
        };
        let destinations = game.legal_moves(square);
        tracing::debug!(%square, count = destinations.len(), "selected");
        self.selection = Some(Selection {
            origin: square,
            destinations,
        });
        MoveOutcome::Selected
    }

    /// A click on a castling rook means the king's castle destination
    fn effective_destination(&self, selection: &Selection, square: Square) -> Square {
        let is_king = self
            .current_snapshot()
            .piece_at(selection.origin)
            .is_some_and(|p| p.role == Role::King);
        if !is_king {
            return square;
        }
        match castle_king_destination(selection.origin, square) {
            Some(king_to) if selection.allows(king_to) => king_to,
            _ => square,
        }
    }

    fn play_human(&mut self, from: Square, to: Square) -> Result<MoveOutcome, SessionError> {
        let Some(game) = self.game.as_mut() else {
            return Ok(MoveOutcome::Ignored);
        };
        let played = game.apply_move(from, to)?;
        let snapshot = game.export_snapshot();
        tracing::debug!(mv = %played.pair, san = %played.san, "human move");

        self.status = Status::from_snapshot(&snapshot);
        self.history
            .record(HistoryEntry::new(played.san, snapshot, played.pair));

        let ai_queued = self.queue_ai();
        Ok(MoveOutcome::Moved { ai_queued })
    }

    /// Enter the queued phase unless the position is already decided.
    fn queue_ai(&mut self) -> bool {
        let snapshot = self.current_snapshot();
        if snapshot.is_terminal() || snapshot.turn() != ENGINE_SIDE {
            return false;
        }
        self.phase = Phase::Queued;
        self.status = Status::Thinking;
        true
    }

    /// Lend the live game to a search job. Only valid in the queued phase.
    pub fn take_ai_job(&mut self) -> Option<AiJob<F::Game>> {
        if self.phase != Phase::Queued {
            return None;
        }
        let game = self.game.take()?;
        self.phase = Phase::Searching;
        Some(AiJob::new(
            game,
            self.ai_config,
            self.history.current_ply(),
            self.generation,
        ))
    }

    /// Take back the game from a finished job and record its move.
    ///
    /// Returns `Ok(false)` when the completion belongs to a game that has
    /// since been replaced.
    pub fn complete_ai(&mut self, completion: AiCompletion<F::Game>) -> Result<bool, SessionError> {
        if completion.generation != self.generation || self.phase != Phase::Searching {
            tracing::debug!(
                generation = completion.generation,
                current = self.generation,
                "discarding stale search result"
            );
            return Ok(false);
        }

        self.game = Some(completion.game);
        self.phase = Phase::Idle;

        match completion.result {
            Ok(reply) => {
                tracing::info!(
                    san = %reply.played.san,
                    elapsed_ms = completion.elapsed.as_millis() as u64,
                    "engine move"
                );
                self.status = Status::from_snapshot(&reply.snapshot);
                self.selection = None;
                self.history.record_after(
                    completion.prefix_ply,
                    HistoryEntry::new(reply.played.san, reply.snapshot, reply.played.pair),
                );
                Ok(true)
            }
            Err(e) => {
                tracing::error!(error = %e, "engine search failed");
                self.status = Status::EngineFailed(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Run a queued search inline. Returns whether a move was recorded.
    #[cfg(test)]
    pub fn run_pending_ai(&mut self) -> Result<bool, SessionError> {
        match self.take_ai_job() {
            Some(job) => self.complete_ai(job.run()),
            None => Ok(false),
        }
    }

    /// Queue the engine again after a failed search.
    pub fn resume_ai(&mut self) -> bool {
        if self.is_ai_in_flight() {
            return false;
        }
        self.queue_ai()
    }

    /// Restore the position at `ply`.
    pub fn rollback(&mut self, ply: usize) -> Result<RollbackOutcome, SessionError> {
        if self.is_ai_in_flight() {
            return Ok(RollbackOutcome::Ignored);
        }
        let Some(entry) = self.history.get(ply) else {
            return Ok(RollbackOutcome::Ignored);
        };
        let snapshot = entry.snapshot.clone();

        // Build the replacement before touching any state.
        let game = self.factory.construct(Some(&snapshot))?;
        self.game = Some(game);
        self.generation += 1;
        self.history.go_to(ply);
        self.selection = None;
        self.status = Status::from_snapshot(&snapshot);
        tracing::info!(ply, fen = snapshot.fen(), "rolled back");

        let ai_queued = self.queue_ai();
        Ok(RollbackOutcome::Restored { ai_queued })
    }

    /// Roll back to the previous position with the human to move
    pub fn step_back(&mut self) -> Result<RollbackOutcome, SessionError> {
        let current = self.history.current_ply();
        if current == 0 {
            return Ok(RollbackOutcome::Ignored);
        }
        self.rollback((current - 1) & !1)
    }

    /// Roll forward to the next position with the human to move (or the end)
    pub fn step_forward(&mut self) -> Result<RollbackOutcome, SessionError> {
        let current = self.history.current_ply();
        let next = ((current + 2) & !1).min(self.history.last_ply());
        if next <= current {
            return Ok(RollbackOutcome::Ignored);
        }
        self.rollback(next)
    }

    pub fn rollback_to_start(&mut self) -> Result<RollbackOutcome, SessionError> {
        self.rollback(0)
    }

    pub fn rollback_to_end(&mut self) -> Result<RollbackOutcome, SessionError> {
        if self.history.is_at_end() {
            return Ok(RollbackOutcome::Ignored);
        }
        self.rollback(self.history.last_ply())
    }

    /// Start over from the session's start position.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        let game = self.factory.construct(self.start.as_ref())?;
        let snapshot = game.export_snapshot();

        self.game = Some(game);
        self.generation += 1;
        self.phase = Phase::Idle;
        self.selection = None;
        self.status = Status::from_snapshot(&snapshot);
        self.history.reset(snapshot);
        tracing::info!("new game");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use shakmaty::uci::UciMove;
    use shakmaty::{Chess, Move};

    use super::*;
    use crate::domain::ai_config::SearchParams;
    use crate::engine::{Searcher, ShakmatyFactory};

    /// Plays a fixed list of UCI moves, one per search
    struct Scripted(Mutex<VecDeque<&'static str>>);

    impl Searcher for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn choose_move(&self, position: &Chess, _: &SearchParams) -> Result<Move, FacadeError> {
            let next = self
                .0
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| FacadeError::Search("script exhausted".to_string()))?;
            let uci: UciMove = next.parse().unwrap();
            Ok(uci.to_move(position).unwrap())
        }
    }

    fn session_with(replies: &[&'static str], fen: Option<&str>) -> Session<ShakmatyFactory> {
        let searcher = Arc::new(Scripted(Mutex::new(replies.iter().copied().collect())));
        let start = fen.map(|f| ShakmatyFactory::snapshot_from_fen(f).unwrap());
        Session::new(ShakmatyFactory::new(searcher), start, AiConfig::default()).unwrap()
    }

    fn session(replies: &[&'static str]) -> Session<ShakmatyFactory> {
        session_with(replies, None)
    }

    fn click(session: &mut Session<ShakmatyFactory>, sq: Square) -> MoveOutcome {
        session.attempt_move(sq).unwrap()
    }

    fn play(session: &mut Session<ShakmatyFactory>, from: Square, to: Square) -> MoveOutcome {
        assert_eq!(click(session, from), MoveOutcome::Selected);
        click(session, to)
    }

    fn play_pair(session: &mut Session<ShakmatyFactory>, from: Square, to: Square) {
        assert_eq!(play(session, from, to), MoveOutcome::Moved { ai_queued: true });
        assert!(session.run_pending_ai().unwrap());
        assert_pointer_at_end(session);
    }

    fn assert_pointer_at_end(session: &Session<ShakmatyFactory>) {
        assert_eq!(session.current_ply(), session.history().len() - 1);
    }

    fn ten_ply_session() -> Session<ShakmatyFactory> {
        let mut s = session(&["e7e5", "b8c6", "g8f6", "f8c5", "d7d6"]);
        play_pair(&mut s, Square::E2, Square::E4);
        play_pair(&mut s, Square::G1, Square::F3);
        play_pair(&mut s, Square::F1, Square::C4);
        play_pair(&mut s, Square::B1, Square::C3);
        play_pair(&mut s, Square::D2, Square::D3);
        s
    }

    #[test]
    fn test_new_session_state() {
        let s = session(&[]);
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.current_ply(), 0);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.status(), &Status::Normal { to_move: Color::White });
        assert!(s.selection().is_none());
        assert!(s.last_move().is_none());
    }

    #[test]
    fn test_e2e4_records_and_queues_ai() {
        let mut s = session(&["e7e5"]);
        assert_eq!(
            play(&mut s, Square::E2, Square::E4),
            MoveOutcome::Moved { ai_queued: true }
        );

        assert_eq!(s.history().len(), 2);
        assert_pointer_at_end(&s);
        let entry = s.history().get(1).unwrap();
        assert_eq!(entry.label, "e4");
        assert_eq!(entry.last_move, Some(MovePair::new(Square::E2, Square::E4)));
        assert_eq!(entry.snapshot.piece_at(Square::E4).map(|p| p.role), Some(Role::Pawn));
        assert!(entry.snapshot.piece_at(Square::E2).is_none());
        assert_eq!(s.phase(), Phase::Queued);
        assert_eq!(s.status(), &Status::Thinking);
        assert!(s.selection().is_none());

        assert!(s.run_pending_ai().unwrap());
        assert_eq!(s.history().len(), 3);
        assert_pointer_at_end(&s);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.history().get(2).unwrap().label, "e5");
        assert_eq!(s.last_move(), Some(MovePair::new(Square::E7, Square::E5)));
    }

    #[test]
    fn test_start_entry_is_stable() {
        let mut s = ten_ply_session();
        let root = s.history().root().snapshot.clone();
        assert_eq!(root, BoardSnapshot::from_position(&Chess::default()));
        s.rollback(4).unwrap();
        assert_eq!(
            play(&mut s, Square::D2, Square::D4),
            MoveOutcome::Moved { ai_queued: true }
        );
        assert_eq!(s.history().root().snapshot, root);
        assert!(s.history().root().last_move.is_none());
    }

    #[test]
    fn test_select_requires_owned_piece() {
        let mut s = session(&[]);
        assert_eq!(click(&mut s, Square::E4), MoveOutcome::Ignored);
        assert!(s.selection().is_none());
        assert_eq!(click(&mut s, Square::E7), MoveOutcome::Ignored);
        assert!(s.selection().is_none());

        assert_eq!(click(&mut s, Square::G1), MoveOutcome::Selected);
        let selection = s.selection().unwrap();
        assert_eq!(selection.origin, Square::G1);
        assert!(selection.allows(Square::F3));
        assert!(selection.allows(Square::H3));
        assert_eq!(selection.destinations.len(), 2);
    }

    #[test]
    fn test_non_destination_click_deselects() {
        let mut s = session(&[]);
        click(&mut s, Square::E2);
        assert_eq!(click(&mut s, Square::E5), MoveOutcome::Deselected);
        assert!(s.selection().is_none());
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_clicking_selected_square_deselects() {
        let mut s = session(&[]);
        click(&mut s, Square::E2);
        assert_eq!(click(&mut s, Square::E2), MoveOutcome::Deselected);
        assert!(s.selection().is_none());
    }

    #[test]
    fn test_clicking_other_own_piece_reselects() {
        let mut s = session(&[]);
        click(&mut s, Square::E2);
        assert_eq!(click(&mut s, Square::D2), MoveOutcome::Selected);
        assert_eq!(s.selection().unwrap().origin, Square::D2);
    }

    #[test]
    fn test_blocked_piece_selects_with_no_destinations() {
        let mut s = session(&[]);
        assert_eq!(click(&mut s, Square::A1), MoveOutcome::Selected);
        assert!(s.selection().unwrap().destinations.is_empty());
        assert_eq!(click(&mut s, Square::A3), MoveOutcome::Deselected);
    }

    #[test]
    fn test_moves_ignored_while_ai_in_flight() {
        let mut s = session(&["e7e5"]);
        play(&mut s, Square::E2, Square::E4);
        assert_eq!(s.phase(), Phase::Queued);

        let before = s.history().len();
        assert_eq!(click(&mut s, Square::D2), MoveOutcome::Ignored);
        assert!(s.selection().is_none());
        assert_eq!(s.rollback(0).unwrap(), RollbackOutcome::Ignored);
        assert_eq!(s.history().len(), before);

        let job = s.take_ai_job().unwrap();
        assert_eq!(s.phase(), Phase::Searching);
        assert!(s.take_ai_job().is_none());
        assert_eq!(click(&mut s, Square::D2), MoveOutcome::Ignored);
        assert_eq!(s.rollback(0).unwrap(), RollbackOutcome::Ignored);

        assert!(s.complete_ai(job.run()).unwrap());
        assert_eq!(click(&mut s, Square::D2), MoveOutcome::Selected);
    }

    #[test]
    fn test_moves_ignored_when_not_human_turn() {
        let mut s = ten_ply_session();
        s.rollback(1).unwrap();
        // queued AI blocks first; after failure the engine is still to move
        let job = s.take_ai_job().unwrap();
        let mut completion = job.run();
        completion.result = Err(FacadeError::Search("offline".to_string()));
        assert!(s.complete_ai(completion).is_err());

        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.current_snapshot().turn(), ENGINE_SIDE);
        assert_eq!(click(&mut s, Square::E7), MoveOutcome::Ignored);
        assert_eq!(click(&mut s, Square::D2), MoveOutcome::Ignored);
        assert!(s.selection().is_none());
    }

    #[test]
    fn test_castling_by_clicking_rook() {
        let mut s = session_with(
            &["a7a6"],
            Some("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1"),
        );
        assert_eq!(click(&mut s, Square::E1), MoveOutcome::Selected);
        assert!(s.selection().unwrap().allows(Square::G1));
        assert_eq!(
            click(&mut s, Square::H1),
            MoveOutcome::Moved { ai_queued: true }
        );

        let entry = s.history().current();
        assert_eq!(entry.last_move, Some(MovePair::new(Square::E1, Square::G1)));
        assert_eq!(entry.label, "O-O");
        assert_eq!(entry.snapshot.piece_at(Square::G1).map(|p| p.role), Some(Role::King));
        assert_eq!(entry.snapshot.piece_at(Square::F1).map(|p| p.role), Some(Role::Rook));
        assert!(entry.snapshot.piece_at(Square::H1).is_none());
    }

    #[test]
    fn test_queen_side_castle_by_clicking_rook() {
        let mut s = session_with(
            &["a7a6"],
            Some("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1"),
        );
        click(&mut s, Square::E1);
        assert_eq!(
            click(&mut s, Square::A1),
            MoveOutcome::Moved { ai_queued: true }
        );
        assert_eq!(
            s.last_move(),
            Some(MovePair::new(Square::E1, Square::C1))
        );
    }

    #[test]
    fn test_rook_click_reselects_when_castle_illegal() {
        // f1 is occupied, so no king side castle
        let mut s = session_with(&[], Some("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3KB1R w KQkq - 0 1"));
        click(&mut s, Square::E1);
        assert!(!s.selection().unwrap().allows(Square::G1));
        assert_eq!(click(&mut s, Square::H1), MoveOutcome::Selected);
        assert_eq!(s.selection().unwrap().origin, Square::H1);
    }

    #[test]
    fn test_checkmate_stops_play() {
        let mut s = session(&["e7e5", "b8c6", "g8f6"]);
        play_pair(&mut s, Square::E2, Square::E4);
        play_pair(&mut s, Square::F1, Square::C4);
        play_pair(&mut s, Square::D1, Square::H5);
        assert_eq!(
            play(&mut s, Square::H5, Square::F7),
            MoveOutcome::Moved { ai_queued: false }
        );

        assert_eq!(s.status(), &Status::Checkmate { winner: Color::White });
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.history().current().label, "Qxf7#");
        assert_pointer_at_end(&s);

        let len = s.history().len();
        assert_eq!(click(&mut s, Square::E4), MoveOutcome::Ignored);
        assert!(s.selection().is_none());
        assert_eq!(s.history().len(), len);
        assert!(!s.resume_ai());
    }

    #[test]
    fn test_rollback_to_mate_names_winner() {
        let mut s = session(&["e7e5", "b8c6", "g8f6"]);
        play_pair(&mut s, Square::E2, Square::E4);
        play_pair(&mut s, Square::F1, Square::C4);
        play_pair(&mut s, Square::D1, Square::H5);
        play(&mut s, Square::H5, Square::F7);

        s.rollback(0).unwrap();
        assert_eq!(s.status(), &Status::Normal { to_move: Color::White });
        assert_eq!(
            s.rollback(7).unwrap(),
            RollbackOutcome::Restored { ai_queued: false }
        );
        assert_eq!(s.status(), &Status::Checkmate { winner: Color::White });
        assert_eq!(s.last_move(), Some(MovePair::new(Square::H5, Square::F7)));
    }

    #[test]
    fn test_rollback_to_start_then_move_truncates() {
        let mut s = ten_ply_session();
        assert_eq!(s.history().len(), 11);

        assert_eq!(
            s.rollback(0).unwrap(),
            RollbackOutcome::Restored { ai_queued: false }
        );
        assert_eq!(s.current_ply(), 0);
        assert_eq!(s.history().len(), 11);
        assert!(s.last_move().is_none());

        assert_eq!(
            play(&mut s, Square::D2, Square::D4),
            MoveOutcome::Moved { ai_queued: true }
        );
        assert_eq!(s.history().len(), 2);
        assert_pointer_at_end(&s);
        assert_eq!(s.history().get(1).unwrap().label, "d4");
    }

    #[test]
    fn test_rollback_then_move_keeps_prefix() {
        let mut s = ten_ply_session();
        s.rollback(4).unwrap();
        assert_eq!(play(&mut s, Square::A2, Square::A3), MoveOutcome::Moved { ai_queued: true });
        assert_eq!(s.history().len(), 6);
        assert_eq!(s.history().get(3).unwrap().label, "Nf3");
    }

    #[test]
    fn test_rollback_to_engine_turn_resumes_ai() {
        let mut s = session(&["e7e5", "b8c6", "c7c5"]);
        play_pair(&mut s, Square::E2, Square::E4);
        play_pair(&mut s, Square::G1, Square::F3);
        assert_eq!(
            s.rollback(1).unwrap(),
            RollbackOutcome::Restored { ai_queued: true }
        );
        assert_eq!(s.status(), &Status::Thinking);
        assert_eq!(s.history().len(), 5);

        assert!(s.run_pending_ai().unwrap());
        assert_eq!(s.history().len(), 3);
        assert_eq!(s.history().get(2).unwrap().label, "c5");
        assert_pointer_at_end(&s);
    }

    #[test]
    fn test_rollback_out_of_range_is_noop() {
        let mut s = ten_ply_session();
        let generation = s.generation();
        assert_eq!(s.rollback(42).unwrap(), RollbackOutcome::Ignored);
        assert_eq!(s.rollback(11).unwrap(), RollbackOutcome::Ignored);
        assert_eq!(s.current_ply(), 10);
        assert_eq!(s.generation(), generation);
    }

    #[test]
    fn test_rollback_clears_selection() {
        let mut s = ten_ply_session();
        click(&mut s, Square::A2);
        assert!(s.selection().is_some());
        s.rollback(2).unwrap();
        assert!(s.selection().is_none());
    }

    #[test]
    fn test_step_navigation() {
        let mut s = ten_ply_session();
        s.step_back().unwrap();
        assert_eq!(s.current_ply(), 8);
        s.step_back().unwrap();
        assert_eq!(s.current_ply(), 6);
        s.step_forward().unwrap();
        assert_eq!(s.current_ply(), 8);
        s.rollback_to_start().unwrap();
        assert_eq!(s.current_ply(), 0);
        assert_eq!(s.step_back().unwrap(), RollbackOutcome::Ignored);
        s.rollback_to_end().unwrap();
        assert_eq!(s.current_ply(), 10);
        assert_eq!(s.step_forward().unwrap(), RollbackOutcome::Ignored);
    }

    #[test]
    fn test_reset() {
        let mut s = ten_ply_session();
        click(&mut s, Square::A2);
        s.reset().unwrap();
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.current_ply(), 0);
        assert!(s.selection().is_none());
        assert!(s.last_move().is_none());
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.status(), &Status::Normal { to_move: Color::White });
    }

    #[test]
    fn test_reset_discards_running_search() {
        let mut s = session(&["e7e5"]);
        play(&mut s, Square::E2, Square::E4);
        let job = s.take_ai_job().unwrap();
        s.reset().unwrap();
        assert_eq!(s.phase(), Phase::Idle);

        assert!(!s.complete_ai(job.run()).unwrap());
        assert_eq!(s.history().len(), 1);
        assert_eq!(click(&mut s, Square::E2), MoveOutcome::Selected);
    }

    #[test]
    fn test_engine_failure_returns_game() {
        let mut s = session(&[]);
        play(&mut s, Square::E2, Square::E4);
        let err = s.run_pending_ai().unwrap_err();
        assert!(matches!(err, SessionError::Facade(FacadeError::Search(_))));
        assert!(matches!(s.status(), Status::EngineFailed(_)));
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.history().len(), 2);

        // the live game is back, so the session can be rolled back
        assert_eq!(
            s.rollback(0).unwrap(),
            RollbackOutcome::Restored { ai_queued: false }
        );
    }

    #[test]
    fn test_resume_after_failure() {
        let mut s = session(&[]);
        play(&mut s, Square::E2, Square::E4);
        assert!(s.run_pending_ai().is_err());
        assert!(s.resume_ai());
        assert_eq!(s.phase(), Phase::Queued);
        assert_eq!(s.status(), &Status::Thinking);
    }

    #[test]
    fn test_engine_to_move_start_rejected() {
        let searcher = Arc::new(Scripted(Mutex::new(VecDeque::new())));
        let start = ShakmatyFactory::snapshot_from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
        )
        .unwrap();
        let result = Session::new(ShakmatyFactory::new(searcher), Some(start), AiConfig::default());
        assert!(matches!(result, Err(SessionError::EngineToMoveAtStart)));
    }

    #[test]
    fn test_stalemated_start_rejected() {
        let searcher = Arc::new(Scripted(Mutex::new(VecDeque::new())));
        let start = ShakmatyFactory::snapshot_from_fen("K7/8/1q6/8/8/8/8/k7 w - - 0 1").unwrap();
        let result = Session::new(ShakmatyFactory::new(searcher), Some(start), AiConfig::default());
        assert!(matches!(result, Err(SessionError::TerminalStart)));
    }

    #[test]
    fn test_set_ai_config_validates() {
        let mut s = session(&[]);
        let mut params = SearchParams::default();
        params.depth = 0;
        assert!(s.set_ai_config(AiConfig::Custom(params)).is_err());
        assert_eq!(s.ai_config(), &AiConfig::default());

        let level = AiConfig::level(5).unwrap();
        s.set_ai_config(level).unwrap();
        assert_eq!(s.ai_config(), &level);
    }

    #[test]
    fn test_job_uses_config_and_prefix() {
        let mut s = session(&["e7e5"]);
        s.set_ai_config(AiConfig::level(1).unwrap()).unwrap();
        play(&mut s, Square::E2, Square::E4);
        let job = s.take_ai_job().unwrap();
        assert_eq!(job.config(), &AiConfig::level(1).unwrap());
        assert_eq!(job.prefix_ply(), 1);
        assert_eq!(job.generation(), s.generation());
        assert!(s.complete_ai(job.run()).unwrap());
    }
}
