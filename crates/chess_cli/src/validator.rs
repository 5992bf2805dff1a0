//! Move legality backed by the engine's own move generator.

use chess_core::{CoordMove, MoveValidator, Position, PositionError, PositionResult};
use engine_channel::protocol::{go_perft_command, parse_perft_moves, position_command};
use engine_channel::{EngineChannel, EngineResult};
use tracing::debug;

/// Asks the engine for `go perft 1` on the current position and accepts the
/// move only if it appears in the per-move breakdown.
///
/// A promotion listed by the engine (`e7e8q`) makes the bare `e7e8` legal.
pub struct EnginePerftValidator<'a> {
    channel: &'a mut EngineChannel,
}

impl<'a> EnginePerftValidator<'a> {
    pub fn new(channel: &'a mut EngineChannel) -> Self {
        Self { channel }
    }

    fn legal_moves(&mut self, fen: &str) -> EngineResult<Vec<String>> {
        self.channel.talk(&position_command(fen))?;
        let transcript = self.channel.talk_transcript(&go_perft_command(1))?;
        Ok(parse_perft_moves(&transcript)
            .into_iter()
            .map(|(mv, _)| mv)
            .collect())
    }
}

impl MoveValidator for EnginePerftValidator<'_> {
    fn is_legal(&mut self, position: &Position, mv: CoordMove) -> PositionResult<bool> {
        let legal = self
            .legal_moves(&position.to_fen())
            .map_err(|e| PositionError::Validation(Box::new(e)))?;
        let wanted = mv.to_string();
        let found = legal.iter().any(|m| m.get(..4) == Some(wanted.as_str()));
        debug!(%mv, legal_moves = legal.len(), found, "engine legality check");
        Ok(found)
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod validator_tests;
