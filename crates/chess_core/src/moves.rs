//! Coordinate moves and the pluggable legality capability.

use std::fmt;
use std::str::FromStr;

use crate::board::Position;
use crate::error::{PositionError, PositionResult};
use crate::types::{Square, file_to_col, rank_to_row};

/// A move in long-algebraic coordinate form (`e2e4`).
///
/// Promotion suffixes are not part of this type; callers reading engine
/// output decide what to do with them before parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CoordMove {
    pub from: Square,
    pub to: Square,
}

impl CoordMove {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

impl FromStr for CoordMove {
    type Err = PositionError;

    fn from_str(text: &str) -> PositionResult<Self> {
        let malformed = || PositionError::MalformedMove {
            text: text.to_string(),
        };
        let b = text.as_bytes();
        if b.len() != 4 {
            return Err(malformed());
        }
        let from = Square {
            col: file_to_col(b[0]).ok_or_else(malformed)?,
            row: rank_to_row(b[1]).ok_or_else(malformed)?,
        };
        let to = Square {
            col: file_to_col(b[2]).ok_or_else(malformed)?,
            row: rank_to_row(b[3]).ok_or_else(malformed)?,
        };
        Ok(CoordMove { from, to })
    }
}

impl fmt::Display for CoordMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from.coord(), self.to.coord())
    }
}

/// Decides whether a move may be played from a position.
///
/// This crate knows no chess rules. Implementations live elsewhere, for
/// example one that asks a UCI engine for its perft move list.
pub trait MoveValidator {
    /// Returns `Ok(false)` for an illegal move and `Err` when no verdict
    /// could be reached.
    fn is_legal(&mut self, position: &Position, mv: CoordMove) -> PositionResult<bool>;
}

/// Accepts every move. Equivalent to passing no validator at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl MoveValidator for AcceptAll {
    fn is_legal(&mut self, _position: &Position, _mv: CoordMove) -> PositionResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
#[path = "moves_tests.rs"]
mod moves_tests;
