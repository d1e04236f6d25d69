//! Bounded stack of move snapshots used to take moves back.

use crate::engine::types::{Cell, ChessError, Move, PieceKind};

/// Default history capacity in ply (200 full moves).
pub const DEFAULT_CAPACITY: usize = 400;

/// Everything needed to reverse one applied move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub last_move: Move,
    /// Kind that left `from`; differs from what sits on `to` after a promotion.
    pub moved: PieceKind,
    /// Whatever occupied `to` before the move.
    pub captured: Cell,
}

/// Ordered snapshots with a hard ply cap.
#[derive(Clone, Debug)]
pub struct History {
    snapshots: Vec<Snapshot>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        History {
            snapshots: Vec::new(),
            capacity,
        }
    }

    /// Append a snapshot, refusing once `capacity` entries are stored.
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), ChessError> {
        if self.is_full() {
            return Err(ChessError::HistoryFull {
                capacity: self.capacity,
            });
        }
        self.snapshots.push(snapshot);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Snapshot> {
        self.snapshots.pop()
    }

    /// Number of stored ply; the next free slot.
    #[inline]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.snapshots.len() >= self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
