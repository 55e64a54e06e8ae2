//! Pure chess domain types and utilities.
//! No GPUI dependencies - this is the domain layer.

use std::fmt;

use shakmaty::{Color, File, Rank, Square};

/// The side played from the board. Odd plies belong to this side.
pub const HUMAN_SIDE: Color = Color::White;

/// The side answered by the search back end. Even plies (> 0) belong to it.
pub const ENGINE_SIDE: Color = Color::Black;

/// An (origin, destination) pair as seen by the board.
///
/// Castling is stored as the king's move, e.g. `e1 -> g1`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MovePair {
    pub from: Square,
    pub to: Square,
}

impl MovePair {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    /// Whether the square takes part in this move (for last-move highlighting)
    pub fn touches(&self, sq: Square) -> bool {
        self.from == sq || self.to == sq
    }
}

impl fmt::Display for MovePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// Convert row/col (0-indexed, row 0 = rank 8) to shakmaty Square
pub fn to_square(row: usize, col: usize) -> Square {
    let file = File::new(col as u32);
    let rank = Rank::new(7 - row as u32); // row 0 = rank 8, row 7 = rank 1
    Square::from_coords(file, rank)
}

/// Convert a square back to (row, col) in board orientation
pub fn to_row_col(sq: Square) -> (usize, usize) {
    (7 - sq.rank() as usize, sq.file() as usize)
}

/// King destination for a click on a castling rook.
///
/// Only a king on its home square with the target on the same rank's corner
/// qualifies; the caller still has to check the destination is legal.
pub fn castle_king_destination(king: Square, target: Square) -> Option<Square> {
    let home_rank = king.rank() == Rank::First || king.rank() == Rank::Eighth;
    if king.file() != File::E || !home_rank || target.rank() != king.rank() {
        return None;
    }
    match target.file() {
        File::H => Some(Square::from_coords(File::G, king.rank())),
        File::A => Some(Square::from_coords(File::C, king.rank())),
        _ => None,
    }
}

/// Number of the full move a ply belongs to (ply 1 and 2 are move 1)
pub fn move_number(ply: usize) -> usize {
    (ply + 1) / 2
}

/// Whether a ply (> 0) was played by the engine side
pub fn is_engine_ply(ply: usize) -> bool {
    ply > 0 && ply % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_round_trip_corners() {
        assert_eq!(to_square(0, 0), Square::A8);
        assert_eq!(to_square(7, 7), Square::H1);
        assert_eq!(to_row_col(Square::E4), (4, 4));
    }

    #[test]
    fn test_castle_destination() {
        assert_eq!(castle_king_destination(Square::E1, Square::H1), Some(Square::G1));
        assert_eq!(castle_king_destination(Square::E1, Square::A1), Some(Square::C1));
        assert_eq!(castle_king_destination(Square::E8, Square::H8), Some(Square::G8));
        assert_eq!(castle_king_destination(Square::E8, Square::A8), Some(Square::C8));
    }

    #[test]
    fn test_castle_destination_rejects_non_home_king() {
        assert_eq!(castle_king_destination(Square::F1, Square::H1), None);
        assert_eq!(castle_king_destination(Square::E2, Square::H2), None);
        assert_eq!(castle_king_destination(Square::E1, Square::H8), None);
        assert_eq!(castle_king_destination(Square::E1, Square::F1), None);
    }

    #[test]
    fn test_move_numbers() {
        assert_eq!(move_number(1), 1);
        assert_eq!(move_number(2), 1);
        assert_eq!(move_number(3), 2);
        assert!(!is_engine_ply(0));
        assert!(!is_engine_ply(1));
        assert!(is_engine_ply(2));
    }

    #[test]
    fn test_move_pair_display() {
        let mv = MovePair::new(Square::E2, Square::E4);
        assert_eq!(mv.to_string(), "e2e4");
        assert!(mv.touches(Square::E4));
        assert!(!mv.touches(Square::D4));
    }
}
