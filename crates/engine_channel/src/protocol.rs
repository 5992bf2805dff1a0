//! UCI line classification and parsing helpers.

/// Line prefixes that end an engine response.
pub const TERMINATORS: [&str; 7] = [
    "uciok",
    "readyok",
    "Unknown command",
    "bestmove",
    "registration",
    "copyprotection",
    "Nodes",
];

/// Commands the engine never answers. Reading after one of these would block
/// forever.
pub const SILENT_COMMANDS: [&str; 3] = ["position", "ucinewgame", "setoption"];

pub fn is_terminator(line: &str) -> bool {
    TERMINATORS.iter().any(|t| line.starts_with(t))
}

pub fn is_silent_command(command: &str) -> bool {
    SILENT_COMMANDS.iter().any(|c| command.starts_with(c))
}

/// The engine did not understand the last command.
pub fn is_unknown_command(line: &str) -> bool {
    line.starts_with("Unknown command")
}

pub fn position_command(fen: &str) -> String {
    format!("position fen {fen}")
}

pub fn go_depth_command(depth: u32) -> String {
    format!("go depth {depth}")
}

pub fn go_perft_command(depth: u32) -> String {
    format!("go perft {depth}")
}

pub fn set_option_command(name: &str, value: &str) -> String {
    format!("setoption name {name} value {value}")
}

/// Parsed `bestmove <move> [ponder <move>]` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestMove<'a> {
    pub mv: &'a str,
    pub ponder: Option<&'a str>,
}

impl BestMove<'_> {
    /// `(none)` and `0000` mean the engine has nothing to play.
    pub fn is_null(&self) -> bool {
        self.mv == "(none)" || self.mv == "0000"
    }
}

pub fn parse_bestmove(line: &str) -> Option<BestMove<'_>> {
    let rest = line.strip_prefix("bestmove")?;
    let mut tokens = rest.split_whitespace();
    let mv = tokens.next()?;
    let mut ponder = None;
    while let Some(tok) = tokens.next() {
        if tok == "ponder" {
            ponder = tokens.next();
        }
    }
    Some(BestMove { mv, ponder })
}

/// Node total from a perft summary such as `Nodes searched: 20`.
pub fn parse_perft_nodes(line: &str) -> Option<u64> {
    let rest = line.strip_prefix("Nodes")?;
    let (_, count) = rest.split_once(':')?;
    count.trim().parse().ok()
}

/// Per-move perft lines (`e2e4: 1`) from a perft transcript.
pub fn parse_perft_moves<S: AsRef<str>>(lines: &[S]) -> Vec<(String, u64)> {
    lines
        .iter()
        .filter_map(|line| {
            let (mv, count) = line.as_ref().split_once(':')?;
            let mv = mv.trim();
            let well_formed = (4..=5).contains(&mv.len())
                && mv.bytes().all(|b| b.is_ascii_alphanumeric());
            if !well_formed {
                return None;
            }
            Some((mv.to_string(), count.trim().parse().ok()?))
        })
        .collect()
}

/// Option name from the remainder of an `option ...` line.
pub fn parse_option_name(line: &str) -> Option<String> {
    let mut tokens = line.split_whitespace().peekable();
    while let Some(tok) = tokens.next() {
        if tok == "name" {
            let mut parts = Vec::new();
            while let Some(next) = tokens.peek() {
                if *next == "type" {
                    break;
                }
                parts.push(*next);
                tokens.next();
            }
            if !parts.is_empty() {
                return Some(parts.join(" "));
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod protocol_tests;
