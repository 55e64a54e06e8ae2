//! The game facade implemented on top of `shakmaty`.

use std::sync::Arc;

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, File, Move, Position, Role, Square};

use crate::domain::ai_config::AiConfig;
use crate::domain::chess::MovePair;
use crate::domain::facade::{AiReply, FacadeError, GameFactory, LiveGame, PlayedMove};
use crate::domain::snapshot::BoardSnapshot;
use crate::engine::Searcher;

/// Builds [`ShakmatyGame`]s that share one searcher
#[derive(Clone)]
pub struct ShakmatyFactory {
    searcher: Arc<dyn Searcher>,
}

impl ShakmatyFactory {
    pub fn new(searcher: Arc<dyn Searcher>) -> Self {
        Self { searcher }
    }

    pub fn searcher(&self) -> &Arc<dyn Searcher> {
        &self.searcher
    }

    /// Parse and validate a FEN into a snapshot
    pub fn snapshot_from_fen(fen: &str) -> Result<BoardSnapshot, FacadeError> {
        position_from_fen(fen).map(|pos| BoardSnapshot::from_position(&pos))
    }
}

impl GameFactory for ShakmatyFactory {
    type Game = ShakmatyGame;

    fn construct(&self, snapshot: Option<&BoardSnapshot>) -> Result<ShakmatyGame, FacadeError> {
        let position = match snapshot {
            Some(snapshot) => position_from_snapshot(snapshot)?,
            None => Chess::default(),
        };
        Ok(ShakmatyGame {
            position,
            searcher: Arc::clone(&self.searcher),
        })
    }
}

/// Rebuild from the FEN, checking the board and rights it must reproduce
fn position_from_snapshot(snapshot: &BoardSnapshot) -> Result<Chess, FacadeError> {
    let position = position_from_fen(snapshot.fen())?;
    let rebuilt = BoardSnapshot::from_position(&position);
    if rebuilt.board() != snapshot.board()
        || rebuilt.turn() != snapshot.turn()
        || rebuilt.castling_rights() != snapshot.castling_rights()
        || rebuilt.ep_square() != snapshot.ep_square()
    {
        return Err(FacadeError::InvalidPosition {
            fen: snapshot.fen().to_string(),
            reason: "FEN does not reproduce the snapshot".to_string(),
        });
    }
    Ok(position)
}

fn position_from_fen(fen: &str) -> Result<Chess, FacadeError> {
    let invalid = |reason: String| FacadeError::InvalidPosition {
        fen: fen.to_string(),
        reason,
    };
    let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{}", e)))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(format!("{}", e)))
}

/// A live game: one `shakmaty` position plus the searcher for AI replies
pub struct ShakmatyGame {
    position: Chess,
    searcher: Arc<dyn Searcher>,
}

impl ShakmatyGame {
    /// Play `mv`, which must be legal, and describe it
    fn play(&mut self, mv: Move) -> Result<PlayedMove, FacadeError> {
        let Some(pair) = board_pair(&mv) else {
            return Err(FacadeError::Search("drop moves are not supported".to_string()));
        };
        let san = San::from_move(&self.position, mv.clone()).to_string();
        let next = self
            .position
            .clone()
            .play(mv)
            .map_err(|_| FacadeError::IllegalMove {
                from: pair.from,
                to: pair.to,
            })?;

        let suffix = if next.is_checkmate() {
            "#"
        } else if next.is_check() {
            "+"
        } else {
            ""
        };
        self.position = next;
        Ok(PlayedMove {
            pair,
            san: format!("{}{}", san, suffix),
        })
    }
}

/// Origin and destination as the board shows them; castling lands the king
/// on the G or C file.
fn board_pair(mv: &Move) -> Option<MovePair> {
    match mv {
        Move::Normal { from, to, .. } | Move::EnPassant { from, to } => {
            Some(MovePair::new(*from, *to))
        }
        Move::Castle { king, rook } => {
            let file = if rook.file() == File::H { File::G } else { File::C };
            Some(MovePair::new(*king, Square::from_coords(file, king.rank())))
        }
        Move::Put { .. } => None,
    }
}

impl LiveGame for ShakmatyGame {
    fn legal_moves(&self, square: Square) -> Vec<Square> {
        let mut destinations = Vec::new();
        for m in &self.position.legal_moves() {
            if let Some(pair) = board_pair(m) {
                // promotions share a destination
                if pair.from == square && !destinations.contains(&pair.to) {
                    destinations.push(pair.to);
                }
            }
        }
        destinations
    }

    fn apply_move(&mut self, from: Square, to: Square) -> Result<PlayedMove, FacadeError> {
        let wanted = MovePair::new(from, to);
        let mut chosen: Option<Move> = None;
        for m in &self.position.legal_moves() {
            if board_pair(m) != Some(wanted) {
                continue;
            }
            // auto-promote to queen
            let is_queen = m.promotion() == Some(Role::Queen);
            if chosen.is_none() || is_queen {
                chosen = Some(m.clone());
            }
        }
        match chosen {
            Some(mv) => self.play(mv),
            None => Err(FacadeError::IllegalMove { from, to }),
        }
    }

    fn export_snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::from_position(&self.position)
    }

    fn run_ai(&mut self, config: &AiConfig) -> Result<AiReply, FacadeError> {
        let legal = self.position.legal_moves();
        if legal.is_empty() {
            return Err(FacadeError::NoLegalMove {
                fen: self.export_snapshot().fen().to_string(),
            });
        }

        let params = config.params();
        let mv = self.searcher.choose_move(&self.position, &params)?;
        if !legal.contains(&mv) {
            return Err(FacadeError::Search(format!(
                "{} returned an illegal move",
                self.searcher.name()
            )));
        }

        let played = self.play(mv)?;
        Ok(AiReply {
            played,
            snapshot: self.export_snapshot(),
        })
    }
}
