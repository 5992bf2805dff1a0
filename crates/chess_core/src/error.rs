//! Errors raised while parsing or mutating a position.

use crate::moves::CoordMove;

/// Errors that can occur while reading FEN text or applying moves
#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    /// FEN text is structurally invalid
    #[error("Malformed FEN '{fen}': {reason}")]
    MalformedFen { fen: String, reason: String },

    /// Move text is not a 4-character coordinate pair
    #[error("Malformed move '{text}': expected a coordinate pair such as e2e4")]
    MalformedMove { text: String },

    /// A validator rejected the move
    #[error("Illegal move: {0}")]
    IllegalMove(CoordMove),

    /// The validator itself could not reach a verdict
    #[error("Move validation failed: {0}")]
    Validation(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PositionError {
    pub(crate) fn malformed_fen(fen: &str, reason: impl Into<String>) -> Self {
        PositionError::MalformedFen {
            fen: fen.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for position operations
pub type PositionResult<T> = Result<T, PositionError>;
