//! Square-centric board: one [`Cell`] per square plus the side to move.
//!
//! `Board` knows how to apply and revert a single move. It does not judge
//! legality; that is the job of [`crate::engine::game::Game`], which pairs
//! every apply with a check test and keeps the undo history.

use crate::engine::history::Snapshot;
use crate::engine::types::{Cell, ChessError, Color, Move, PieceKind, Square};

/// Placement of the standard starting position.
pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Piece placement indexed by [`Square`] (a8 = 0 … h1 = 63).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; Square::NUM],
    side_to_move: Color,
}

impl Board {
    /// Create an empty board, White to move.
    pub fn empty() -> Self {
        Board {
            cells: [Cell::Empty; Square::NUM],
            side_to_move: Color::White,
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        let mut board = Self::empty();
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file, &kind) in back_rank.iter().enumerate() {
            let file = file as u8;
            let pawn = PieceKind::Pawn;
            board.put(Square::from_file_rank(file, 7), Color::Black, kind);
            board.put(Square::from_file_rank(file, 6), Color::Black, pawn);
            board.put(Square::from_file_rank(file, 1), Color::White, pawn);
            board.put(Square::from_file_rank(file, 0), Color::White, kind);
        }
        board
    }

    // -----------------------------------------------------------------------
    // Piece manipulation (low-level)
    // -----------------------------------------------------------------------

    #[inline]
    pub fn put(&mut self, sq: Square, color: Color, kind: PieceKind) {
        self.cells[sq.index()] = Cell::Occupied(color, kind);
    }

    #[inline]
    pub fn clear(&mut self, sq: Square) {
        self.cells[sq.index()] = Cell::Empty;
    }

    pub fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[inline]
    pub fn cell(&self, sq: Square) -> Cell {
        self.cells[sq.index()]
    }

    /// All 64 cells in square order.
    #[inline]
    pub fn cells(&self) -> &[Cell; Square::NUM] {
        &self.cells
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// The side not on move. Always `!side_to_move()`.
    #[inline]
    pub fn opponent(&self) -> Color {
        !self.side_to_move
    }

    /// Squares and kinds of every piece of `color`, in square order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, PieceKind)> + '_ {
        Square::all().filter_map(move |sq| match self.cell(sq) {
            Cell::Occupied(c, kind) if c == color => Some((sq, kind)),
            _ => None,
        })
    }

    /// First king of `color` in square order, if any.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|&(_, kind)| kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    // -----------------------------------------------------------------------
    // Apply / revert
    // -----------------------------------------------------------------------

    /// Apply `mv` for the side to move and flip the turn.
    ///
    /// The move is checked for shape only (own piece on `from`, no own piece
    /// on `to`, sane promotion). Nothing is mutated when an error is returned.
    /// Castling is rejected outright.
    pub fn apply(&mut self, mv: Move) -> Result<Snapshot, ChessError> {
        let us = self.side_to_move;

        if mv.flags.is_castling() {
            return Err(ChessError::NotImplemented("castling"));
        }
        if mv.from == mv.to {
            return Err(invalid(mv, "source and destination are the same square"));
        }
        let moved = match self.cell(mv.from) {
            Cell::Occupied(color, kind) if color == us => kind,
            Cell::Occupied(..) => {
                return Err(invalid(mv, "that piece belongs to the opponent"));
            }
            Cell::Empty => {
                return Err(invalid(mv, "no piece on the source square"));
            }
        };
        let captured = self.cell(mv.to);
        if captured.is_color(us) {
            return Err(invalid(mv, "destination holds one of your pieces"));
        }

        let landing = if mv.flags.is_promotion() {
            match mv.promotion {
                Some(kind) if moved == PieceKind::Pawn && kind.is_promotion_target() => kind,
                Some(kind) => {
                    return Err(ChessError::InvalidPromotion(format!(
                        "{moved} cannot become a {kind}"
                    )));
                }
                None => {
                    return Err(ChessError::InvalidPromotion(
                        "promotion piece required".to_string(),
                    ));
                }
            }
        } else {
            moved
        };

        let victim = if mv.flags.is_en_passant() {
            let behind = en_passant_victim(us, mv.to)
                .filter(|&sq| self.cell(sq).is_piece(!us, PieceKind::Pawn))
                .ok_or_else(|| invalid(mv, "no pawn to capture en passant"))?;
            Some(behind)
        } else {
            None
        };

        let snapshot = Snapshot {
            last_move: mv,
            moved,
            captured,
        };

        // The piece leaves before it arrives.
        self.clear(mv.from);
        self.put(mv.to, us, landing);
        if let Some(sq) = victim {
            self.clear(sq);
        }

        self.side_to_move = !us;
        Ok(snapshot)
    }

    /// Reverse the move recorded in `snapshot`, which must be the most
    /// recent one applied to this board.
    pub fn revert(&mut self, snapshot: &Snapshot) {
        self.side_to_move = !self.side_to_move;
        let us = self.side_to_move;
        let mv = snapshot.last_move;

        self.put(mv.from, us, snapshot.moved);
        self.cells[mv.to.index()] = snapshot.captured;

        if mv.flags.is_en_passant()
            && let Some(sq) = en_passant_victim(us, mv.to)
        {
            self.put(sq, !us, PieceKind::Pawn);
        }
    }

    // -----------------------------------------------------------------------
    // Placement text
    // -----------------------------------------------------------------------

    /// Parse the piece-placement field of a FEN string (rank 8 first).
    ///
    /// Any fields after the first whitespace are ignored; the side to move
    /// is left as White.
    pub fn from_placement(text: &str) -> Result<Self, ChessError> {
        let placement = text
            .split_whitespace()
            .next()
            .ok_or_else(|| ChessError::InvalidPlacement("empty placement".to_string()))?;

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidPlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut board = Board::empty();
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8;
            let mut file: u8 = 0;
            for ch in rank_str.chars() {
                if file > 7 {
                    return Err(ChessError::InvalidPlacement(format!(
                        "too many squares in rank {}",
                        rank + 1
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidPlacement(format!(
                            "invalid empty count '{ch}' in rank {}",
                            rank + 1
                        )));
                    }
                    file += digit as u8;
                } else if let Some((color, kind)) = PieceKind::from_char(ch) {
                    board.put(Square::from_file_rank(file, rank), color, kind);
                    file += 1;
                } else {
                    return Err(ChessError::InvalidPlacement(format!(
                        "invalid character '{ch}'"
                    )));
                }
            }
            if file != 8 {
                return Err(ChessError::InvalidPlacement(format!(
                    "rank {} has {} squares instead of 8",
                    rank + 1,
                    file
                )));
            }
        }
        Ok(board)
    }

    /// Export the piece placement as the first field of a FEN string.
    pub fn to_placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8 {
                match self.cell(Square::from_file_rank(file, rank)) {
                    Cell::Occupied(color, kind) => {
                        if empty_count > 0 {
                            out.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        out.push(kind.to_char(color));
                    }
                    Cell::Empty => empty_count += 1,
                }
            }
            if empty_count > 0 {
                out.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    /// Render the board as a plain 8-line grid (rank 8 at top).
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8 {
                s.push(self.cell(Square::from_file_rank(file, rank)).to_char());
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

/// Square of the pawn removed when `us` captures en passant onto `to`.
fn en_passant_victim(us: Color, to: Square) -> Option<Square> {
    let idx = match us {
        Color::White => to.0.checked_add(8),
        Color::Black => to.0.checked_sub(8),
    }?;
    (idx < Square::NUM as u8).then_some(Square(idx))
}

fn invalid(mv: Move, reason: &str) -> ChessError {
    ChessError::InvalidMove {
        from: mv.from,
        to: mv.to,
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::MoveFlags;

    fn sq(name: &str) -> Square {
        Square::from_coord(name).unwrap()
    }

    fn mv(from: &str, to: &str) -> Move {
        Move::new(sq(from), sq(to))
    }

    #[test]
    fn starting_placement_round_trip() {
        let board = Board::starting();
        assert_eq!(board.to_placement(), STARTING_PLACEMENT);
        assert_eq!(Board::from_placement(STARTING_PLACEMENT).unwrap(), board);
    }

    #[test]
    fn starting_position_layout() {
        let board = Board::starting();
        assert_eq!(board.side_to_move(), Color::White);
        assert_eq!(board.opponent(), Color::Black);
        assert_eq!(
            board.cell(sq("e1")),
            Cell::Occupied(Color::White, PieceKind::King)
        );
        assert_eq!(
            board.cell(sq("d8")),
            Cell::Occupied(Color::Black, PieceKind::Queen)
        );
        assert_eq!(
            board.cell(Square(0)),
            Cell::Occupied(Color::Black, PieceKind::Rook)
        );
        assert_eq!(board.pieces(Color::White).count(), 16);
        assert_eq!(board.pieces(Color::Black).count(), 16);
        for rank in 2..6 {
            for file in 0..8 {
                assert!(board.cell(Square::from_file_rank(file, rank)).is_empty());
            }
        }
    }

    #[test]
    fn king_square_lookup() {
        let board = Board::starting();
        assert_eq!(board.king_square(Color::White), Some(sq("e1")));
        assert_eq!(board.king_square(Color::Black), Some(sq("e8")));
        assert_eq!(Board::empty().king_square(Color::White), None);
    }

    #[test]
    fn placement_ignores_trailing_fields() {
        let board = Board::from_placement("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(board.pieces(Color::White).count(), 1);
        assert_eq!(board.to_placement(), "4k3/8/8/8/8/8/8/4K3");
    }

    #[test]
    fn placement_errors() {
        assert!(Board::from_placement("").is_err());
        assert!(Board::from_placement("8/8/8").is_err());
        assert!(Board::from_placement("9/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("7/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("ppppppppp/8/8/8/8/8/8/8").is_err());
        assert!(matches!(
            Board::from_placement("x7/8/8/8/8/8/8/8"),
            Err(ChessError::InvalidPlacement(_))
        ));
    }

    #[test]
    fn apply_and_revert_quiet_move() {
        let mut board = Board::starting();
        let before = board.clone();
        let snap = board.apply(mv("g1", "f3")).unwrap();
        assert_eq!(board.cell(sq("g1")), Cell::Empty);
        assert_eq!(
            board.cell(sq("f3")),
            Cell::Occupied(Color::White, PieceKind::Knight)
        );
        assert_eq!(board.side_to_move(), Color::Black);
        assert_eq!(snap.captured, Cell::Empty);
        assert_eq!(snap.moved, PieceKind::Knight);

        board.revert(&snap);
        assert_eq!(board, before);
    }

    #[test]
    fn apply_and_revert_capture() {
        let mut board = Board::from_placement("4k3/8/8/3p4/4P3/8/8/4K3").unwrap();
        let before = board.clone();
        let capture = Move::with_flags(
            sq("e4"),
            sq("d5"),
            MoveFlags::CAPTURE | MoveFlags::PAWN_MOVE,
        );
        let snap = board.apply(capture).unwrap();
        assert_eq!(snap.captured, Cell::Occupied(Color::Black, PieceKind::Pawn));
        assert_eq!(
            board.cell(sq("d5")),
            Cell::Occupied(Color::White, PieceKind::Pawn)
        );
        board.revert(&snap);
        assert_eq!(board, before);
    }

    #[test]
    fn promotion_reverts_to_pawn() {
        let mut board = Board::from_placement("4k3/P7/8/8/8/8/8/4K3").unwrap();
        let before = board.clone();
        let (a7, a8) = (sq("a7"), sq("a8"));
        let promo = Move::with_promotion(a7, a8, PieceKind::Queen, MoveFlags::PAWN_MOVE);
        let snap = board.apply(promo).unwrap();
        assert_eq!(
            board.cell(sq("a8")),
            Cell::Occupied(Color::White, PieceKind::Queen)
        );
        board.revert(&snap);
        assert_eq!(
            board.cell(sq("a7")),
            Cell::Occupied(Color::White, PieceKind::Pawn)
        );
        assert_eq!(board, before);
    }

    #[test]
    fn promotion_requires_valid_piece() {
        let mut board = Board::from_placement("4k3/P7/8/8/8/8/8/4K3").unwrap();
        let before = board.clone();

        let (a7, a8) = (sq("a7"), sq("a8"));
        let mut no_piece = Move::new(a7, a8);
        no_piece.flags = MoveFlags::PROMOTION;
        assert!(matches!(
            board.apply(no_piece),
            Err(ChessError::InvalidPromotion(_))
        ));

        let to_king = Move::with_promotion(a7, a8, PieceKind::King, MoveFlags::NONE);
        assert!(matches!(
            board.apply(to_king),
            Err(ChessError::InvalidPromotion(_))
        ));

        let (e1, e2) = (sq("e1"), sq("e2"));
        let king_promo = Move::with_promotion(e1, e2, PieceKind::Queen, MoveFlags::NONE);
        assert!(matches!(
            board.apply(king_promo),
            Err(ChessError::InvalidPromotion(_))
        ));

        assert_eq!(board, before);
    }

    #[test]
    fn en_passant_removes_pawn_behind() {
        let mut board = Board::from_placement("4k3/8/8/3pP3/8/8/8/4K3").unwrap();
        let before = board.clone();
        let ep = Move::with_flags(
            sq("e5"),
            sq("d6"),
            MoveFlags::CAPTURE | MoveFlags::EN_PASSANT | MoveFlags::PAWN_MOVE,
        );
        let snap = board.apply(ep).unwrap();
        assert_eq!(board.cell(sq("d5")), Cell::Empty);
        assert_eq!(
            board.cell(sq("d6")),
            Cell::Occupied(Color::White, PieceKind::Pawn)
        );
        board.revert(&snap);
        assert_eq!(board, before);
    }

    #[test]
    fn black_en_passant_removes_pawn_above() {
        let mut board = Board::from_placement("4k3/8/8/8/3Pp3/8/8/4K3").unwrap();
        board.set_side_to_move(Color::Black);
        let before = board.clone();
        let ep = Move::with_flags(
            sq("e4"),
            sq("d3"),
            MoveFlags::CAPTURE | MoveFlags::EN_PASSANT | MoveFlags::PAWN_MOVE,
        );
        let snap = board.apply(ep).unwrap();
        assert_eq!(board.cell(sq("d4")), Cell::Empty);
        assert_eq!(board.cell(sq("e4")), Cell::Empty);
        assert_eq!(
            board.cell(sq("d3")),
            Cell::Occupied(Color::Black, PieceKind::Pawn)
        );
        assert_eq!(board.side_to_move(), Color::White);

        board.revert(&snap);
        assert_eq!(
            board.cell(sq("d4")),
            Cell::Occupied(Color::White, PieceKind::Pawn)
        );
        assert_eq!(board, before);
    }

    #[test]
    fn en_passant_without_victim_is_rejected() {
        let mut board = Board::from_placement("4k3/8/8/4P3/8/8/8/4K3").unwrap();
        let ep = Move::with_flags(sq("e5"), sq("d6"), MoveFlags::EN_PASSANT);
        assert!(matches!(
            board.apply(ep),
            Err(ChessError::InvalidMove { .. })
        ));
    }

    #[test]
    fn castling_is_not_implemented() {
        let mut board = Board::from_placement("4k3/8/8/8/8/8/8/4K2R").unwrap();
        let before = board.clone();
        let castle = Move::with_flags(sq("e1"), sq("g1"), MoveFlags::CASTLING);
        assert_eq!(
            board.apply(castle),
            Err(ChessError::NotImplemented("castling"))
        );
        assert_eq!(board, before);
    }

    #[test]
    fn shape_errors_leave_board_untouched() {
        let mut board = Board::starting();
        let before = board.clone();
        assert!(board.apply(mv("e4", "e5")).is_err());
        assert!(board.apply(mv("e7", "e5")).is_err());
        assert!(board.apply(mv("a1", "a2")).is_err());
        assert!(board.apply(mv("e2", "e2")).is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn board_string_layout() {
        let s = Board::starting().board_string();
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines[0], "8 r n b q k b n r");
        assert_eq!(lines[7], "1 R N B Q K B N R");
        assert_eq!(lines[8], "  a b c d e f g h");
    }
}
