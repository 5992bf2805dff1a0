//! Text-mode chess front-end for UCI engines
//!
//! This crate wires [`chess_core`] and [`engine_channel`] together:
//! - Configuration from a TOML file and command-line flags
//! - The interactive game loop (human vs engine)
//! - One-shot best-move and perft queries
//! - Engine-backed move legality and JSON game records
//!
//! # Usage
//!
//! ```bash
//! # Play White against Stockfish at depth 5
//! cargo run -p chess_cli -- --engine ./stockfish play --side white --depth 5
//!
//! # Perft from a position, as counted by the engine
//! cargo run -p chess_cli -- perft --depth 3 --fen "8/8/8/8/8/8/8/K6k w - - 0 1"
//! ```

mod analysis;
mod cli;
mod config;
mod record;
mod session;
mod validator;

#[cfg(test)]
mod test_support;

pub use analysis::*;
pub use cli::*;
pub use config::*;
pub use record::*;
pub use session::*;
pub use validator::*;
