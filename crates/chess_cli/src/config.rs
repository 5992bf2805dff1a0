//! Front-end configuration
//!
//! Values come from an optional TOML file and are then overridden by
//! command-line flags (see `cli.rs`). [`Config::validate`] runs once before
//! the engine is started.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chess_core::{Color, Position, PositionError, STARTPOS_FEN};
use engine_channel::EngineCommand;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default search depth for `go depth`
pub const DEFAULT_DEPTH: u32 = 3;

/// Default bounded wait for an engine response, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors raised while loading or checking the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("invalid start position: {0}")]
    StartPosition(#[from] PositionError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineSettings,
    pub game: GameSettings,
}

/// How to run and set up the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Engine executable
    pub path: PathBuf,
    /// Extra command-line arguments for the engine
    pub args: Vec<String>,
    /// Bounded wait per response; 0 waits forever
    pub timeout_secs: u64,
    /// Sent as `setoption name <key> value <value>` after the handshake
    pub options: BTreeMap<String, toml::Value>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./stockfish"),
            args: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            options: BTreeMap::new(),
        }
    }
}

impl EngineSettings {
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn command(&self) -> EngineCommand {
        EngineCommand {
            path: self.path.clone(),
            args: self.args.clone(),
            read_timeout: self.read_timeout(),
        }
    }

    /// Option values as the engine expects them: strings unquoted, everything
    /// else in its TOML spelling.
    pub fn option_pairs(&self) -> Vec<(String, String)> {
        self.options
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), value)
            })
            .collect()
    }
}

/// Which colour the human plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SideChoice {
    /// Prompt at the start of the game
    #[default]
    Ask,
    White,
    Black,
    Random,
}

impl SideChoice {
    /// Resolves everything except `Ask`, which needs the terminal.
    pub fn resolve(self) -> Option<Color> {
        match self {
            SideChoice::Ask => None,
            SideChoice::White => Some(Color::White),
            SideChoice::Black => Some(Color::Black),
            SideChoice::Random => {
                if rand::thread_rng().gen_bool(0.5) {
                    Some(Color::White)
                } else {
                    Some(Color::Black)
                }
            }
        }
    }
}

/// Game setup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub side: SideChoice,
    /// Depth passed to `go depth`, also the default perft depth
    pub depth: u32,
    /// Starting position
    pub fen: String,
    /// Ask the engine (`go perft 1`) whether each human move is legal
    pub validate_moves: bool,
    /// Write a JSON game record here when the game ends
    pub record: Option<PathBuf>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            side: SideChoice::Ask,
            depth: DEFAULT_DEPTH,
            fen: STARTPOS_FEN.to_string(),
            validate_moves: false,
            record: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("engine path is empty".to_string()));
        }
        if self.game.depth == 0 {
            return Err(ConfigError::Invalid("depth must be at least 1".to_string()));
        }
        Position::from_fen(&self.game.fen)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
