pub mod attacks;
pub mod board;
pub mod game;
pub mod history;
pub mod mailbox;
pub mod movegen;
pub mod types;

pub use attacks::{in_check, under_attack};
pub use board::Board;
pub use game::{BoardView, Game, PieceView};
pub use history::{History, Snapshot};
pub use movegen::{legal_moves, legal_moves_from, pseudo_legal_moves};
pub use types::*;
