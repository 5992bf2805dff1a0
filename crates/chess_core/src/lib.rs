//! Position state for the text-mode UCI front-end.
//!
//! A [`Position`] is the board plus the five auxiliary FEN fields. It can be
//! read from and written to FEN text, mutated by coordinate moves, and drawn
//! as a text diagram. There is no move generator here: legality, when it is
//! wanted at all, comes from a [`MoveValidator`] supplied by the caller.

pub mod board;
pub mod error;
pub mod moves;
pub mod types;

pub use board::*;
pub use error::*;
pub use moves::*;
pub use types::*;
