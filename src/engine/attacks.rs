//! Attack and check detection by walking the mailbox step tables.
//!
//! The same routine backs check tests and the legality filter in
//! [`crate::engine::movegen::legal_moves`].

use crate::engine::board::Board;
use crate::engine::mailbox::{destination, offsets, pawn_captures, ray, slides};
use crate::engine::types::{Cell, ChessError, Color, PieceKind, Square};

/// Is `target` attacked by any piece of colour `by`?
///
/// The piece (if any) standing on `target` never blocks its own square, and
/// a piece never attacks the square it stands on.
pub fn under_attack(board: &Board, target: Square, by: Color) -> bool {
    board
        .pieces(by)
        .any(|(from, kind)| from != target && attacks_from(board, from, by, kind, target))
}

/// Does a `color` `kind` on `from` attack `target`?
pub fn attacks_from(
    board: &Board,
    from: Square,
    color: Color,
    kind: PieceKind,
    target: Square,
) -> bool {
    if kind == PieceKind::Pawn {
        return pawn_captures(color)
            .iter()
            .any(|&offset| destination(from, offset) == Ok(target));
    }

    let sliding = slides(kind);
    offsets(kind).iter().any(|&offset| {
        for sq in ray(from, offset, sliding) {
            if sq == target {
                return true;
            }
            if board.cell(sq) != Cell::Empty {
                return false;
            }
        }
        false
    })
}

/// Is `side`'s king attacked by the other side?
///
/// A board with no king of that colour is reported as
/// [`ChessError::MissingKing`] rather than "not in check".
pub fn in_check(board: &Board, side: Color) -> Result<bool, ChessError> {
    let king = board
        .king_square(side)
        .ok_or(ChessError::MissingKing(side))?;
    Ok(under_attack(board, king, !side))
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_coord(name).unwrap()
    }

    fn board(placement: &str) -> Board {
        Board::from_placement(placement).unwrap()
    }

    #[test]
    fn starting_king_not_attacked_after_e4() {
        // 1. e4 on the starting position; the e1 king stays safe from Black.
        let b = board("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR");
        assert!(!under_attack(&b, sq("e1"), Color::Black));
        assert_eq!(in_check(&b, Color::White), Ok(false));
    }

    #[test]
    fn starting_position_attack_map() {
        let b = Board::starting();
        // Knights and pawns reach the third rank.
        assert!(under_attack(&b, sq("f3"), Color::White));
        assert!(under_attack(&b, sq("a3"), Color::White));
        // Nothing reaches the fourth rank.
        for file in 0..8 {
            let fourth = Square::from_file_rank(file, 3);
            assert!(!under_attack(&b, fourth, Color::White));
        }
        assert!(under_attack(&b, sq("c6"), Color::Black));
        assert!(!under_attack(&b, sq("e5"), Color::Black));
    }

    #[test]
    fn pawn_attacks_do_not_wrap() {
        let b = board("4k3/8/8/8/8/8/P6P/4K3");
        assert!(under_attack(&b, sq("b3"), Color::White));
        assert!(under_attack(&b, sq("g3"), Color::White));
        // a2 pawn must not "see" h-file squares via index arithmetic.
        assert!(!under_attack(&b, sq("h4"), Color::White));
        assert!(!under_attack(&b, sq("h3"), Color::White));
        // Pawns do not attack straight ahead.
        assert!(!under_attack(&b, sq("a3"), Color::White));
    }

    #[test]
    fn black_pawn_attacks_downward() {
        let b = board("4k3/3p4/8/8/8/8/8/4K3");
        assert!(under_attack(&b, sq("c6"), Color::Black));
        assert!(under_attack(&b, sq("e6"), Color::Black));
        assert!(!under_attack(&b, sq("c8"), Color::Black));
        assert!(!under_attack(&b, sq("d6"), Color::Black));
    }

    #[test]
    fn sliders_are_blocked() {
        let b = board("4k3/8/8/8/R2p3K/8/8/8");
        assert!(under_attack(&b, sq("c4"), Color::White));
        assert!(under_attack(&b, sq("d4"), Color::White));
        assert!(!under_attack(&b, sq("e4"), Color::White));

        let b = board("4k3/8/8/8/R2P4/8/8/7K");
        assert!(!under_attack(&b, sq("e4"), Color::White));
        assert!(!under_attack(&b, sq("h4"), Color::White));
    }

    #[test]
    fn bishop_and_queen_diagonals() {
        let b = board("4k3/8/8/8/8/8/8/B3K3");
        assert!(under_attack(&b, sq("h8"), Color::White));
        assert!(!under_attack(&b, sq("a8"), Color::White));

        let b = board("q3k3/8/8/8/8/8/8/4K3");
        assert!(under_attack(&b, sq("h1"), Color::Black));
        assert!(under_attack(&b, sq("a1"), Color::Black));
        assert!(!under_attack(&b, sq("b3"), Color::Black));
    }

    #[test]
    fn knight_jumps_over_pieces() {
        let b = Board::starting();
        let (g1, knight) = (sq("g1"), PieceKind::Knight);
        assert!(attacks_from(&b, g1, Color::White, knight, sq("h3")));
        assert!(!attacks_from(&b, g1, Color::White, knight, sq("g3")));
    }

    #[test]
    fn unrelated_pieces_do_not_attack() {
        // The rook sees e1 only while the first rank is open.
        let b = board("1n2k3/8/8/8/8/8/3P4/r3K3");
        assert!(!under_attack(&b, sq("e2"), Color::Black));
        assert!(under_attack(&b, sq("e1"), Color::Black));

        let b = board("1n2k3/8/8/8/8/8/8/r2PK3");
        assert!(!under_attack(&b, sq("e1"), Color::Black));
    }

    #[test]
    fn king_attacks_adjacent_only() {
        let b = board("8/8/8/3k4/8/8/8/4K3");
        assert!(under_attack(&b, sq("e4"), Color::Black));
        assert!(!under_attack(&b, sq("d3"), Color::Black));
    }

    #[test]
    fn in_check_detects_rook_on_file() {
        let b = board("4r1k1/8/8/8/8/8/8/4K3");
        assert_eq!(in_check(&b, Color::White), Ok(true));
        assert_eq!(in_check(&b, Color::Black), Ok(false));
    }

    #[test]
    fn in_check_without_king_is_an_error() {
        let b = board("8/8/8/8/8/8/4P3/8");
        assert_eq!(
            in_check(&b, Color::White),
            Err(ChessError::MissingKing(Color::White))
        );
    }
}
