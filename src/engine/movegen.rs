//! Move generation.
//!
//! Pipeline:
//!   1. Generate pseudo-legal moves by walking each piece's step table.
//!   2. Filter: apply the move, verify the mover's king is not attacked, revert.
//!
//! Castling and en passant are never generated.

use crate::engine::attacks;
use crate::engine::board::Board;
use crate::engine::mailbox::{destination, offsets, pawn_captures, pawn_push, ray, slides};
use crate::engine::types::{Cell, ChessError, Color, Move, MoveFlags, PieceKind, Square};

// =========================================================================
// Public API
// =========================================================================

/// All pseudo-legal moves for `side`, whoever is on move.
pub fn pseudo_legal_moves(board: &Board, side: Color) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    for (from, kind) in board.pieces(side) {
        match kind {
            PieceKind::Pawn => generate_pawn_moves(board, side, from, &mut moves),
            _ => generate_piece_moves(board, side, from, kind, &mut moves),
        }
    }
    moves
}

/// Pseudo-legal moves for `side` that do not leave its own king attacked.
pub fn legal_moves(board: &Board, side: Color) -> Result<Vec<Move>, ChessError> {
    let mut probe = board.clone();
    probe.set_side_to_move(side);

    let pseudo = pseudo_legal_moves(&probe, side);
    let mut legal = Vec::with_capacity(pseudo.len());
    for mv in pseudo {
        let snapshot = probe.apply(mv)?;
        let exposed = attacks::in_check(&probe, side);
        probe.revert(&snapshot);
        if !exposed? {
            legal.push(mv);
        }
    }
    Ok(legal)
}

/// Legal moves for `side` originating from `from`.
pub fn legal_moves_from(board: &Board, side: Color, from: Square) -> Result<Vec<Move>, ChessError> {
    Ok(legal_moves(board, side)?
        .into_iter()
        .filter(|m| m.from == from)
        .collect())
}

// =========================================================================
// Pawn moves
// =========================================================================

fn generate_pawn_moves(board: &Board, us: Color, from: Square, moves: &mut Vec<Move>) {
    let push = pawn_push(us);
    let start_rank = match us {
        Color::White => 1,
        Color::Black => 6,
    };

    // --- Single and double push ---
    if let Ok(one) = destination(from, push)
        && board.cell(one).is_empty()
    {
        add_pawn_move(us, from, one, MoveFlags::PAWN_MOVE, moves);

        if from.rank() == start_rank
            && let Ok(two) = destination(one, push)
            && board.cell(two).is_empty()
        {
            moves.push(Move::with_flags(
                from,
                two,
                MoveFlags::PAWN_MOVE | MoveFlags::DOUBLE_PUSH,
            ));
        }
    }

    // --- Captures ---
    let capture = MoveFlags::PAWN_MOVE | MoveFlags::CAPTURE;
    for offset in pawn_captures(us) {
        if let Ok(to) = destination(from, offset)
            && board.cell(to).is_color(!us)
        {
            add_pawn_move(us, from, to, capture, moves);
        }
    }
}

/// Push a pawn move, expanding it into all four promotions on the last rank.
fn add_pawn_move(us: Color, from: Square, to: Square, flags: MoveFlags, moves: &mut Vec<Move>) {
    let last_rank = match us {
        Color::White => 7,
        Color::Black => 0,
    };
    if to.rank() == last_rank {
        for promo in PieceKind::PROMOTIONS {
            moves.push(Move::with_promotion(from, to, promo, flags));
        }
    } else {
        moves.push(Move::with_flags(from, to, flags));
    }
}

// =========================================================================
// Knight, bishop, rook, queen, king
// =========================================================================

fn generate_piece_moves(
    board: &Board,
    us: Color,
    from: Square,
    kind: PieceKind,
    moves: &mut Vec<Move>,
) {
    let sliding = slides(kind);
    for &offset in offsets(kind) {
        for to in ray(from, offset, sliding) {
            match board.cell(to) {
                Cell::Empty => moves.push(Move::new(from, to)),
                Cell::Occupied(color, _) => {
                    if color != us {
                        moves.push(Move::with_flags(from, to, MoveFlags::CAPTURE));
                    }
                    break;
                }
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
