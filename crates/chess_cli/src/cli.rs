//! Command-line flags and their merge into [`Config`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{Config, ConfigError, SideChoice};

#[derive(Debug, Parser)]
#[command(
    name = "chess_cli",
    version,
    about = "Play chess in the terminal against a UCI engine"
)]
pub struct Cli {
    /// TOML configuration file; flags override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Engine executable (default ./stockfish)
    #[arg(long, short = 'e', global = true)]
    pub engine: Option<PathBuf>,

    /// Extra argument passed to the engine, may be repeated
    #[arg(long = "engine-arg", global = true, allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Seconds to wait for each engine response, 0 waits forever
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Play a game against the engine (default)
    Play(PlayArgs),
    /// Print the engine's best move for a position
    Analyse(PositionArgs),
    /// Print the engine's perft move list and node count
    Perft(PositionArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct PositionArgs {
    /// Search depth (`go depth N` / `go perft N`)
    #[arg(long, short = 'd')]
    pub depth: Option<u32>,

    /// Starting position in FEN
    #[arg(long)]
    pub fen: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct PlayArgs {
    /// Side the human plays
    #[arg(long, short = 's', value_enum)]
    pub side: Option<SideChoice>,

    #[command(flatten)]
    pub position: PositionArgs,

    /// Ask the engine whether each human move is legal
    #[arg(long)]
    pub validate: bool,

    /// Write a JSON game record to this file
    #[arg(long)]
    pub record: Option<PathBuf>,
}

/// What the front-end should do once the engine is up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Play,
    Analyse,
    Perft,
}

impl Cli {
    /// Loads the config file (if any), applies the flags and validates.
    pub fn resolve(self) -> Result<(Config, RunMode), ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(path) = self.engine {
            config.engine.path = path;
        }
        if !self.engine_args.is_empty() {
            config.engine.args = self.engine_args;
        }
        if let Some(secs) = self.timeout_secs {
            config.engine.timeout_secs = secs;
        }

        let command = self.command.unwrap_or(Command::Play(PlayArgs::default()));
        let mode = match command {
            Command::Play(args) => {
                if let Some(side) = args.side {
                    config.game.side = side;
                }
                if args.validate {
                    config.game.validate_moves = true;
                }
                if args.record.is_some() {
                    config.game.record = args.record;
                }
                apply_position_args(&mut config, args.position);
                RunMode::Play
            }
            Command::Analyse(args) => {
                apply_position_args(&mut config, args);
                RunMode::Analyse
            }
            Command::Perft(args) => {
                apply_position_args(&mut config, args);
                RunMode::Perft
            }
        };

        config.validate()?;
        Ok((config, mode))
    }
}

fn apply_position_args(config: &mut Config, args: PositionArgs) {
    if let Some(depth) = args.depth {
        config.game.depth = depth;
    }
    if let Some(fen) = args.fen {
        config.game.fen = fen;
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
