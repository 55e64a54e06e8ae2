use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use shakmaty::{Chess, Move, Position};

use crate::domain::ai_config::SearchParams;
use crate::domain::facade::FacadeError;
use crate::engine::Searcher;

/// Plays a uniformly random legal move. Used when no engine is configured.
pub struct RandomMover {
    rng: Mutex<StdRng>,
}

impl RandomMover {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomMover {
    fn default() -> Self {
        Self::new()
    }
}

impl Searcher for RandomMover {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(&self, position: &Chess, _params: &SearchParams) -> Result<Move, FacadeError> {
        let moves = position.legal_moves();
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        moves
            .choose(&mut *rng)
            .cloned()
            .ok_or_else(|| FacadeError::Search("no legal move to choose from".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ai_config::AiLevel;

    #[test]
    fn test_choices_are_legal() {
        let mover = RandomMover::seeded(1);
        let params = AiLevel::new(1).unwrap().params();
        let mut pos = Chess::default();
        for _ in 0..20 {
            if pos.is_game_over() {
                break;
            }
            let mv = mover.choose_move(&pos, &params).unwrap();
            assert!(pos.legal_moves().contains(&mv));
            pos = pos.play(mv).unwrap();
        }
    }

    #[test]
    fn test_same_seed_same_moves() {
        let params = SearchParams::default();
        let pos = Chess::default();
        let a = RandomMover::seeded(42);
        let b = RandomMover::seeded(42);
        for _ in 0..5 {
            assert_eq!(
                a.choose_move(&pos, &params).unwrap(),
                b.choose_move(&pos, &params).unwrap()
            );
        }
    }

    #[test]
    fn test_no_moves_is_error() {
        let pos: Chess = "k7/8/1Q6/8/8/8/8/K7 b - - 0 1"
            .parse::<shakmaty::fen::Fen>()
            .unwrap()
            .into_position(shakmaty::CastlingMode::Standard)
            .unwrap();
        assert!(RandomMover::seeded(0).choose_move(&pos, &SearchParams::default()).is_err());
    }
}
