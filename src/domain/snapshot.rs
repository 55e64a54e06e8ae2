//! Immutable board snapshots stored in the history log.

use shakmaty::fen::Fen;
use shakmaty::{Bitboard, Board, Chess, Color, EnPassantMode, Piece, Position, Square};

/// A full description of one position, captured at a single ply.
///
/// Snapshots are only produced by a live game's export and never change once
/// taken. They carry enough bookkeeping (castling rights, en passant square,
/// FEN) for a facade to rebuild a live game from them.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BoardSnapshot {
    board: Board,
    turn: Color,
    check: bool,
    checkmate: bool,
    stalemate: bool,
    castling_rights: Bitboard,
    ep_square: Option<Square>,
    fen: String,
}

impl BoardSnapshot {
    /// Capture the given position
    pub fn from_position(position: &Chess) -> Self {
        let setup = position.to_setup(EnPassantMode::Legal);
        let castling_rights = setup.castling_rights;
        let ep_square = setup.ep_square;
        let fen = Fen::from_position(position, EnPassantMode::Legal).to_string();

        Self {
            board: position.board().clone(),
            turn: position.turn(),
            check: position.is_check(),
            checkmate: position.is_checkmate(),
            stalemate: position.is_stalemate(),
            castling_rights,
            ep_square,
            fen,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board.piece_at(sq)
    }

    /// Side to move
    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn is_check(&self) -> bool {
        self.check
    }

    pub fn is_checkmate(&self) -> bool {
        self.checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.stalemate
    }

    /// No legal move exists for the side to move
    pub fn is_terminal(&self) -> bool {
        self.checkmate || self.stalemate
    }

    /// Squares of rooks that still have castling rights
    pub fn castling_rights(&self) -> Bitboard {
        self.castling_rights
    }

    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    pub fn fen(&self) -> &str {
        &self.fen
    }

    /// Whether the piece on `sq` belongs to `color`
    pub fn is_owned_by(&self, sq: Square, color: Color) -> bool {
        self.piece_at(sq).is_some_and(|p| p.color == color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{CastlingMode, Role};

    fn position(fen: &str) -> Chess {
        fen.parse::<Fen>()
            .unwrap()
            .into_position(CastlingMode::Standard)
            .unwrap()
    }

    #[test]
    fn test_start_position_snapshot() {
        let snapshot = BoardSnapshot::from_position(&Chess::default());
        assert_eq!(snapshot.turn(), Color::White);
        assert!(!snapshot.is_check());
        assert!(!snapshot.is_terminal());
        assert_eq!(
            snapshot.fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
        assert_eq!(snapshot.castling_rights().count(), 4);
        assert_eq!(snapshot.ep_square(), None);
        assert_eq!(snapshot.piece_at(Square::E1).map(|p| p.role), Some(Role::King));
        assert!(snapshot.is_owned_by(Square::E2, Color::White));
        assert!(!snapshot.is_owned_by(Square::E7, Color::White));
        assert!(!snapshot.is_owned_by(Square::E4, Color::White));
    }

    #[test]
    fn test_checkmate_snapshot() {
        // fool's mate, white to move and mated
        let pos = position("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        let snapshot = BoardSnapshot::from_position(&pos);
        assert!(snapshot.is_check());
        assert!(snapshot.is_checkmate());
        assert!(snapshot.is_terminal());
    }

    #[test]
    fn test_stalemate_snapshot() {
        let pos = position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let snapshot = BoardSnapshot::from_position(&pos);
        assert!(!snapshot.is_check());
        assert!(snapshot.is_stalemate());
        assert!(snapshot.is_terminal());
    }

    #[test]
    fn test_en_passant_square_only_when_capturable() {
        let fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2";
        let snapshot = BoardSnapshot::from_position(&position(fen));
        assert_eq!(snapshot.ep_square(), Some(Square::D6));
        assert_eq!(snapshot.fen(), fen);

        // double push with no pawn able to capture
        let snapshot = BoardSnapshot::from_position(&position(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        ));
        assert_eq!(snapshot.ep_square(), None);
        assert_eq!(
            snapshot.fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn test_castling_rights_follow_position() {
        let snapshot = BoardSnapshot::from_position(&position("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1"));
        assert_eq!(snapshot.castling_rights().count(), 2);
        assert!(snapshot.castling_rights().contains(Square::H1));
        assert!(snapshot.castling_rights().contains(Square::A8));
        assert!(snapshot.fen().contains(" w Kq - "));
    }
}
