//! Errors raised by the engine channel.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Transport-level failures. Engine replies such as `Unknown command` are
/// not errors; they come back as ordinary response text.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine process could not be started
    #[error("failed to spawn engine at {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The child was started without one of its stdio pipes
    #[error("{label}: engine has no {pipe} pipe")]
    MissingPipe { label: String, pipe: &'static str },

    /// Writing a command failed (usually a broken pipe)
    #[error("{label}: failed to write to engine: {source}")]
    Io {
        label: String,
        #[source]
        source: io::Error,
    },

    /// The engine's output ended before a terminator line arrived
    #[error("{label}: engine closed its output before answering")]
    Disconnected { label: String },

    /// No terminator line arrived within the read timeout
    #[error("{label}: no engine response within {timeout:?}")]
    Timeout { label: String, timeout: Duration },
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
