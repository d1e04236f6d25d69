//! Stateful game controller wrapping [`Board`].
//!
//! `Game` owns the board and the bounded undo [`History`]. Every applied move
//! is checked against the mover's own king and taken back on the spot if it
//! leaves that king attacked, so callers only ever see committed positions.
//! It is the primary type a presentation layer talks to.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::engine::attacks;
use crate::engine::board::Board;
use crate::engine::history::{DEFAULT_CAPACITY, History};
use crate::engine::mailbox::{destination, pawn_captures};
use crate::engine::movegen;
use crate::engine::types::{Cell, ChessError, Color, GameStatus, Move, PieceKind, Square};

// =========================================================================
// BoardView
// =========================================================================

/// One occupied square as seen by a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PieceView {
    pub color: Color,
    pub kind: PieceKind,
}

/// Read-only copy of the position for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    /// Row-major, rank 8 first; `None` for empty squares.
    pub squares: [[Option<PieceView>; 8]; 8],
    pub side_to_move: Color,
    /// `None` when the side to move has no king.
    pub in_check: Option<bool>,
    pub ply: usize,
}

impl BoardView {
    pub fn at(&self, sq: Square) -> Option<PieceView> {
        self.squares[(sq.0 >> 3) as usize][sq.file() as usize]
    }
}

// =========================================================================
// Game
// =========================================================================

/// A single game: board, undo history and metadata.
///
/// Instances are independent; run one per active game.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    history: History,

    // Metadata
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Start a new game from the standard position, White to move.
    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_CAPACITY)
    }

    /// Standard start with a custom ply cap.
    pub fn with_history_capacity(capacity: usize) -> Self {
        Self::from_board(Board::starting(), capacity)
    }

    /// Wrap an existing board. The history starts empty.
    pub fn from_board(board: Board, capacity: usize) -> Self {
        Self {
            board,
            history: History::new(capacity),
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Set up a position from FEN piece placement with `side` to move.
    ///
    /// The side not on move must not be in check.
    pub fn from_placement(placement: &str, side: Color) -> Result<Self, ChessError> {
        let mut board = Board::from_placement(placement)?;
        board.set_side_to_move(side);
        if attacks::in_check(&board, !side) == Ok(true) {
            return Err(ChessError::InvalidPlacement(format!(
                "{} is in check with {side} to move",
                !side
            )));
        }
        Ok(Self::from_board(board, DEFAULT_CAPACITY))
    }

    /// Back to the starting position with an empty history.
    pub fn reset(&mut self) {
        self.board = Board::starting();
        self.history.clear();
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn opponent(&self) -> Color {
        self.board.opponent()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Ply recorded so far; the history cursor.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Pseudo-legal moves for `side`.
    pub fn generate_moves(&self, side: Color) -> Vec<Move> {
        movegen::pseudo_legal_moves(&self.board, side)
    }

    /// Legal moves for the side to move.
    pub fn legal_moves(&self) -> Result<Vec<Move>, ChessError> {
        movegen::legal_moves(&self.board, self.side_to_move())
    }

    /// Legal moves for the side to move from one square.
    pub fn legal_moves_from(&self, sq: Square) -> Result<Vec<Move>, ChessError> {
        movegen::legal_moves_from(&self.board, self.side_to_move(), sq)
    }

    pub fn is_in_check(&self, side: Color) -> Result<bool, ChessError> {
        attacks::in_check(&self.board, side)
    }

    /// Check, mate and stalemate for the side to move.
    pub fn status(&self) -> Result<GameStatus, ChessError> {
        let in_check = self.is_in_check(self.side_to_move())?;
        let has_moves = !self.legal_moves()?.is_empty();
        Ok(match (has_moves, in_check) {
            (true, false) => GameStatus::Active,
            (true, true) => GameStatus::Check,
            (false, true) => GameStatus::Checkmate,
            (false, false) => GameStatus::Stalemate,
        })
    }

    /// Copy of the position for rendering.
    pub fn board_snapshot(&self) -> BoardView {
        let mut squares = [[None; 8]; 8];
        for sq in Square::all() {
            if let Cell::Occupied(color, kind) = self.board.cell(sq) {
                squares[(sq.0 >> 3) as usize][sq.file() as usize] = Some(PieceView { color, kind });
            }
        }
        BoardView {
            squares,
            side_to_move: self.side_to_move(),
            in_check: self.is_in_check(self.side_to_move()).ok(),
            ply: self.history.len(),
        }
    }

    // -----------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------

    /// Extract `from`/`to` from four-character coordinate text like "e2e4".
    pub fn parse_coordinate_move(text: &str) -> Result<Move, ChessError> {
        Move::from_coords(text)
    }

    // -----------------------------------------------------------------
    // Make / take back
    // -----------------------------------------------------------------

    /// Apply `mv` as given and keep it only if the mover's king is safe.
    ///
    /// The move's flags are trusted; use [`Game::attempt_move`] for raw
    /// `(from, to, promotion)` requests. On any error the board and history
    /// are exactly as before the call.
    pub fn make_move(&mut self, mv: Move) -> Result<(), ChessError> {
        if self.history.is_full() {
            let capacity = self.history.capacity();
            warn!(capacity, mv = %mv, "move history exhausted");
            return Err(ChessError::HistoryFull { capacity });
        }

        let mover = self.side_to_move();
        let snapshot = self.board.apply(mv)?;
        if let Err(err) = self.history.push(snapshot) {
            self.board.revert(&snapshot);
            return Err(err);
        }

        match attacks::in_check(&self.board, mover) {
            Ok(false) => {
                debug!(mv = %mv, side = %mover, ply = self.history.len(), "move accepted");
                Ok(())
            }
            Ok(true) => {
                self.takeback()?;
                debug!(mv = %mv, side = %mover, "move rejected, king left in check");
                Err(ChessError::IllegalMove {
                    from: mv.from,
                    to: mv.to,
                })
            }
            Err(err) => {
                self.takeback()?;
                Err(err)
            }
        }
    }

    /// Resolve a `(from, to, promotion)` request against the generated
    /// moves, then play it. Returns the move with its flags filled in.
    pub fn attempt_move(&mut self, request: Move) -> Result<Move, ChessError> {
        let mv = self.resolve(request)?;
        self.make_move(mv)?;
        Ok(mv)
    }

    /// Undo the most recent move and return it.
    pub fn takeback(&mut self) -> Result<Move, ChessError> {
        let snapshot = self.history.pop().ok_or(ChessError::NothingToUndo)?;
        self.board.revert(&snapshot);
        debug!(mv = %snapshot.last_move, ply = self.history.len(), "took back move");
        Ok(snapshot.last_move)
    }

    // -----------------------------------------------------------------
    // Request resolution
    // -----------------------------------------------------------------

    fn resolve(&self, request: Move) -> Result<Move, ChessError> {
        let us = self.side_to_move();

        if request.flags.is_castling() || self.is_castling_request(request) {
            return Err(ChessError::NotImplemented("castling"));
        }
        if request.flags.is_en_passant() || self.is_en_passant_request(request) {
            return Err(ChessError::NotImplemented("en passant"));
        }

        match self.board.cell(request.from) {
            Cell::Occupied(color, _) if color == us => {}
            Cell::Occupied(..) => {
                return Err(invalid(request, "that piece belongs to the opponent"));
            }
            Cell::Empty => {
                return Err(invalid(request, "no piece on the source square"));
            }
        }
        if let Cell::Occupied(_, PieceKind::King) = self.board.cell(request.to) {
            return Err(invalid(request, "kings cannot be captured"));
        }

        let candidates: Vec<Move> = self
            .generate_moves(us)
            .into_iter()
            .filter(|m| m.from == request.from && m.to == request.to)
            .collect();

        let Some(&first) = candidates.first() else {
            return Err(invalid(request, "that piece cannot move there"));
        };

        if !first.flags.is_promotion() {
            if request.promotion.is_some() {
                return Err(ChessError::InvalidPromotion(
                    "move does not promote".to_string(),
                ));
            }
            return Ok(first);
        }

        let kind = request.promotion.ok_or_else(|| {
            ChessError::InvalidPromotion("promotion piece required".to_string())
        })?;
        candidates
            .into_iter()
            .find(|m| m.promotion == Some(kind))
            .ok_or_else(|| ChessError::InvalidPromotion(format!("cannot promote to {kind}")))
    }

    /// King sliding two files along its rank.
    fn is_castling_request(&self, request: Move) -> bool {
        self.board
            .cell(request.from)
            .is_piece(self.side_to_move(), PieceKind::King)
            && request.from.rank() == request.to.rank()
            && request.from.file().abs_diff(request.to.file()) == 2
    }

    /// Pawn stepping diagonally onto an empty square beside an enemy pawn.
    fn is_en_passant_request(&self, request: Move) -> bool {
        let us = self.side_to_move();
        if !self.board.cell(request.from).is_piece(us, PieceKind::Pawn)
            || !self.board.cell(request.to).is_empty()
        {
            return false;
        }
        let diagonal = pawn_captures(us)
            .iter()
            .any(|&offset| destination(request.from, offset) == Ok(request.to));
        let beside = Square::from_file_rank(request.to.file(), request.from.rank());
        diagonal && self.board.cell(beside).is_piece(!us, PieceKind::Pawn)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(mv: Move, reason: &str) -> ChessError {
    ChessError::InvalidMove {
        from: mv.from,
        to: mv.to,
        reason: reason.to_string(),
    }
}

// =========================================================================
// Tests
// =========================================================================
