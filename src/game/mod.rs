//! Core Minesweeper logic: cell states, the board engine with lazy mine
//! placement and flood-fill reveal, and the fixed action universe.

mod actions;
mod board;
mod cell;

pub use actions::generate_actions;
pub use board::{Board, GameStatus, MarkOutcome, RevealOutcome, OPENING_RADIUS};
pub use cell::Cell;
