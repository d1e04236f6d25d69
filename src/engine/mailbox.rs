//! Padded "mailbox" boundary board and per-piece step tables.
//!
//! Every compact square (0..63) has a home in a 12×10 padded layout whose
//! outer ring is marked off-board. Adding a step offset in padded space and
//! looking the result up either yields the destination square or the
//! off-board sentinel, so ray walking never needs file/rank range checks.
//! Two border rows top and bottom keep the longest knight step (±21) inside
//! the table from any on-board origin.

use crate::engine::types::{ChessError, Color, PieceKind, Square};

/// Sentinel stored in [`BOUNDARY`] for padding squares.
pub const OFF_BOARD: i8 = -1;

/// Width of one padded row.
pub const PADDED_WIDTH: usize = 10;

/// Number of padded squares (12 rows of 10).
pub const PADDED_SIZE: usize = 120;

const BORDER_ROWS: usize = 2;
const BORDER_COLS: usize = 1;

/// Position of each compact square inside the padded layout.
#[rustfmt::skip]
pub const UPSCALE: [u8; 64] = {
    let mut table = [0u8; 64];
    let mut sq = 0;
    while sq < 64 {
        table[sq] = ((sq / 8 + BORDER_ROWS) * PADDED_WIDTH + sq % 8 + BORDER_COLS) as u8;
        sq += 1;
    }
    table
};

/// Padded layout: compact square index, or [`OFF_BOARD`] on the border.
#[rustfmt::skip]
pub const BOUNDARY: [i8; PADDED_SIZE] = {
    let mut table = [OFF_BOARD; PADDED_SIZE];
    let mut sq = 0;
    while sq < 64 {
        table[UPSCALE[sq] as usize] = sq as i8;
        sq += 1;
    }
    table
};

// ---------------------------------------------------------------------------
// Step tables (padded-board offsets)
// ---------------------------------------------------------------------------

pub const KNIGHT_STEPS: [i8; 8] = [-21, -19, -12, -8, 8, 12, 19, 21];
pub const BISHOP_STEPS: [i8; 4] = [-11, -9, 9, 11];
pub const ROOK_STEPS: [i8; 4] = [-10, -1, 1, 10];
pub const ROYAL_STEPS: [i8; 8] = [-11, -10, -9, -1, 1, 9, 10, 11];

/// Single-step offsets for a piece kind. Pawns have their own tables
/// ([`pawn_push`], [`pawn_captures`]) and return an empty slice here.
pub fn offsets(kind: PieceKind) -> &'static [i8] {
    match kind {
        PieceKind::Pawn => &[],
        PieceKind::Knight => &KNIGHT_STEPS,
        PieceKind::Bishop => &BISHOP_STEPS,
        PieceKind::Rook => &ROOK_STEPS,
        PieceKind::Queen | PieceKind::King => &ROYAL_STEPS,
    }
}

/// Whether a piece kind repeats its offset along a line.
#[inline]
pub fn slides(kind: PieceKind) -> bool {
    matches!(kind, PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)
}

/// Forward step for a pawn. White moves toward lower indices.
#[inline]
pub fn pawn_push(color: Color) -> i8 {
    match color {
        Color::White => -10,
        Color::Black => 10,
    }
}

/// Diagonal capture steps for a pawn.
#[inline]
pub fn pawn_captures(color: Color) -> [i8; 2] {
    match color {
        Color::White => [-11, -9],
        Color::Black => [9, 11],
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Square reached from `from` by one padded-board `offset`.
pub fn destination(from: Square, offset: i8) -> Result<Square, ChessError> {
    let padded = UPSCALE[from.index()] as isize + offset as isize;
    match usize::try_from(padded).ok().and_then(|i| BOUNDARY.get(i)) {
        Some(&dest) if dest != OFF_BOARD => Ok(Square(dest as u8)),
        _ => Err(ChessError::OutOfBounds { from, offset }),
    }
}

/// Walk from `from` in one direction: seven steps for sliders, one for
/// everything else. The origin is not yielded and the walk ends at the edge.
/// Callers stop early on occupied squares.
pub fn ray(from: Square, offset: i8, sliding: bool) -> Ray {
    Ray {
        current: from,
        offset,
        remaining: if sliding { 7 } else { 1 },
    }
}

/// Iterator returned by [`ray`].
#[derive(Clone, Debug)]
pub struct Ray {
    current: Square,
    offset: i8,
    remaining: u8,
}

impl Iterator for Ray {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        if self.remaining == 0 {
            return None;
        }
        match destination(self.current, self.offset) {
            Ok(next) => {
                self.remaining -= 1;
                self.current = next;
                Some(next)
            }
            Err(_) => {
                self.remaining = 0;
                None
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
