//! Engine channel for talking to UCI chess engines
//!
//! This crate provides:
//! - A synchronous line channel bound to an engine subprocess (or any stream pair)
//! - Terminator-based response reading with an optional bounded wait
//! - Helpers for classifying and parsing UCI output lines
//!
//! It knows nothing about chess positions; callers hand it pre-formatted
//! command text such as `position fen ...`.

mod channel;
mod error;
pub mod protocol;

pub use channel::*;
pub use error::*;
pub use protocol::{BestMove, is_unknown_command, parse_bestmove};
