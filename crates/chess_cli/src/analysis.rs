//! One-shot engine queries: best move and perft.

use anyhow::{anyhow, bail, Result};
use chess_core::Position;
use engine_channel::protocol::{
    go_depth_command, go_perft_command, parse_perft_moves, parse_perft_nodes, position_command,
};
use engine_channel::{is_unknown_command, parse_bestmove, EngineChannel};

/// Engine's move for `position` at `depth`, or `None` when it has none.
pub fn analyse(channel: &mut EngineChannel, position: &Position, depth: u32) -> Result<Option<String>> {
    channel.talk(&position_command(&position.to_fen()))?;
    let reply = channel.talk(&go_depth_command(depth))?;
    if is_unknown_command(&reply) {
        bail!("engine rejected the search: {reply}");
    }
    let best = parse_bestmove(&reply)
        .ok_or_else(|| anyhow!("expected a bestmove line, engine said: {reply}"))?;
    Ok((!best.is_null()).then(|| best.mv.to_string()))
}

/// Result of `go perft N`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerftReport {
    /// Node count below each root move
    pub moves: Vec<(String, u64)>,
    pub nodes: u64,
}

pub fn perft(channel: &mut EngineChannel, position: &Position, depth: u32) -> Result<PerftReport> {
    channel.talk(&position_command(&position.to_fen()))?;
    let transcript = channel.talk_transcript(&go_perft_command(depth))?;
    let summary = transcript.last().map(String::as_str).unwrap_or_default();
    if is_unknown_command(summary) {
        bail!("engine does not support perft: {summary}");
    }
    let nodes = parse_perft_nodes(summary)
        .ok_or_else(|| anyhow!("expected a perft summary, engine said: {summary}"))?;
    Ok(PerftReport {
        moves: parse_perft_moves(&transcript),
        nodes,
    })
}

#[cfg(test)]
#[path = "analysis_tests.rs"]
mod analysis_tests;
