//! Game record storage

use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameOutcome {
    /// The human typed `quit` or input ended
    Quit,
    /// The engine answered `bestmove (none)` or `bestmove 0000`
    EngineHasNoMove,
}

/// Who played a recorded move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mover {
    Human,
    Engine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEntry {
    pub mover: Mover,
    pub mv: String,
    pub fen_after: String,
}

/// Everything needed to replay a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub engine: Option<String>,
    pub human_side: String,
    pub start_fen: String,
    pub moves: Vec<MoveEntry>,
    pub final_fen: Option<String>,
    pub outcome: Option<GameOutcome>,
}

impl GameRecord {
    pub fn new(start_fen: &str, human_side: &str) -> Self {
        Self {
            engine: None,
            human_side: human_side.to_string(),
            start_fen: start_fen.to_string(),
            moves: Vec::new(),
            final_fen: None,
            outcome: None,
        }
    }

    pub fn push(&mut self, mover: Mover, mv: &str, fen_after: String) {
        self.moves.push(MoveEntry {
            mover,
            mv: mv.to_string(),
            fen_after,
        });
    }

    /// `position fen` resets invalidate the move list
    pub fn restart(&mut self, start_fen: &str) {
        self.start_fen = start_fen.to_string();
        self.moves.clear();
    }

    pub fn finish(&mut self, final_fen: String, outcome: GameOutcome) {
        self.final_fen = Some(final_fen);
        self.outcome = Some(outcome);
    }

    /// Save record to JSON file
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize: {}", e))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write: {}", e))
    }

    /// Load record from JSON file
    pub fn load(path: &Path) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read: {}", e))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse: {}", e))
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod record_tests;
