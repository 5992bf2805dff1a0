//! chess_cli
//!
//! Play against, or query, a UCI engine from the terminal.

use std::io::{self, Write};

use anyhow::{Context, Result};
use chess_cli::{analyse, choose_side, perft, Cli, Config, GameSession, RunMode};
use chess_core::Position;
use clap::Parser;
use engine_channel::protocol::position_command;
use engine_channel::{EngineChannel, EngineInfo};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    // stdout carries the board; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
}

/// Spawns the engine, runs the handshake and applies configured options.
fn start_engine(config: &Config) -> Result<(EngineChannel, EngineInfo)> {
    let mut channel = EngineChannel::spawn(&config.engine.command())?;
    let engine_info = channel.handshake().context("UCI handshake failed")?;

    for (name, value) in config.engine.option_pairs() {
        if !engine_info.options.is_empty() && !engine_info.has_option(&name) {
            warn!(option = %name, "engine does not advertise this option, sending anyway");
        }
        channel.set_option(&name, &value)?;
    }
    channel.ensure_ready().context("engine did not become ready")?;
    Ok((channel, engine_info))
}

fn run_play(config: &Config, channel: &mut EngineChannel, engine_info: EngineInfo) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let Some(human) = choose_side(config.game.side, &mut input, &mut output)? else {
        return Ok(());
    };
    channel.new_game()?;

    let position = Position::from_fen(&config.game.fen)?;
    channel.talk(&position_command(&position.to_fen()))?;
    let mut session =
        GameSession::new(channel, position, human, &config.game).with_engine_name(engine_info.name);
    let outcome = session.run(&mut input, &mut output)?;
    info!(?outcome, "session finished");

    if let Some(path) = &config.game.record {
        session
            .record()
            .save(path)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("failed to save game record to {}", path.display()))?;
        println!("Game record saved to {}", path.display());
    }
    Ok(())
}

fn run_analyse(config: &Config, channel: &mut EngineChannel) -> Result<()> {
    let position = Position::from_fen(&config.game.fen)?;
    match analyse(channel, &position, config.game.depth)? {
        Some(mv) => println!("bestmove {mv}"),
        None => println!("bestmove (none)"),
    }
    Ok(())
}

fn run_perft(config: &Config, channel: &mut EngineChannel) -> Result<()> {
    let position = Position::from_fen(&config.game.fen)?;
    let report = perft(channel, &position, config.game.depth)?;

    let mut out = io::stdout().lock();
    for (mv, nodes) in &report.moves {
        writeln!(out, "{mv}: {nodes}")?;
    }
    writeln!(out)?;
    writeln!(out, "Nodes searched: {}", report.nodes)?;
    Ok(())
}

fn main() -> Result<()> {
    init_logging();

    let (config, mode) = Cli::parse().resolve()?;
    let (mut channel, engine_info) = start_engine(&config)?;

    match mode {
        RunMode::Play => run_play(&config, &mut channel, engine_info),
        RunMode::Analyse => run_analyse(&config, &mut channel),
        RunMode::Perft => run_perft(&config, &mut channel),
    }
}
