//! The driving loop: read a human move, apply it, hand the new position to
//! the engine, apply the engine's reply.

use std::io::{BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use chess_core::{Color, CoordMove, Position, PositionError};
use engine_channel::protocol::{go_depth_command, position_command};
use engine_channel::{is_unknown_command, parse_bestmove, EngineChannel};
use tracing::{debug, info, warn};

use crate::config::{GameSettings, SideChoice};
use crate::record::{GameOutcome, GameRecord, Mover};
use crate::validator::EnginePerftValidator;

const HELP: &str = "\
Commands:
  <move>       play a coordinate move such as e2e4
  fen          print the current position
  fen <FEN>    set up a new position
  board        show the board
  help         show this message
  quit         leave the game
";

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Quit,
    Help,
    Board,
    ShowFen,
    SetFen(&'a str),
    Move(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Empty,
        "quit" | "exit" => Input::Quit,
        "help" | "?" => Input::Help,
        "board" => Input::Board,
        "fen" => Input::ShowFen,
        _ => match line.strip_prefix("fen ") {
            Some(fen) => Input::SetFen(fen.trim()),
            None => Input::Move(line),
        },
    }
}

/// Resolves the human's side, prompting when the choice is `ask`.
/// Returns `None` if input ends before an answer.
pub fn choose_side<R: BufRead, W: Write>(
    choice: SideChoice,
    input: &mut R,
    output: &mut W,
) -> Result<Option<Color>> {
    if let Some(color) = choice.resolve() {
        return Ok(Some(color));
    }
    loop {
        write!(output, "Choose your side (w/b): ")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match Color::from_fen(line.trim()) {
            Some(color) => return Ok(Some(color)),
            None => writeln!(output, "Please answer w or b.")?,
        }
    }
}

/// One game between the terminal and an engine.
///
/// The session owns the position; the engine channel is borrowed for the
/// length of the game.
pub struct GameSession<'a> {
    channel: &'a mut EngineChannel,
    position: Position,
    human: Color,
    depth: u32,
    validate_moves: bool,
    record: GameRecord,
}

impl<'a> GameSession<'a> {
    pub fn new(
        channel: &'a mut EngineChannel,
        position: Position,
        human: Color,
        settings: &GameSettings,
    ) -> Self {
        let side = match human {
            Color::White => "white",
            Color::Black => "black",
        };
        let record = GameRecord::new(&position.to_fen(), side);
        Self {
            channel,
            position,
            human,
            depth: settings.depth,
            validate_moves: settings.validate_moves,
            record,
        }
    }

    pub fn with_engine_name(mut self, name: Option<String>) -> Self {
        self.record.engine = name;
        self
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    /// Plays until the human quits, input ends or the engine has no move.
    ///
    /// Rejected human input is reported on `output` and the loop carries on
    /// with the position unchanged. Engine failures end the game with an error.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<GameOutcome> {
        let outcome = self.play(&mut input, &mut output)?;
        self.record.finish(self.position.to_fen(), outcome);
        info!(?outcome, fen = %self.position, "game over");
        Ok(outcome)
    }

    fn play<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<GameOutcome> {
        let mut show_board = true;
        loop {
            if self.position.side_to_move != self.human {
                match self.engine_turn()? {
                    Some(mv) => writeln!(output, "Engine plays {mv}")?,
                    None => {
                        writeln!(output, "Engine has no move. Game over.")?;
                        return Ok(GameOutcome::EngineHasNoMove);
                    }
                }
                show_board = true;
                continue;
            }

            if show_board {
                write!(output, "{}", self.position.render(self.human))?;
                show_board = false;
            }
            write!(output, "Enter your move: ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(GameOutcome::Quit);
            }

            match parse_input(&line) {
                Input::Empty => {}
                Input::Quit => return Ok(GameOutcome::Quit),
                Input::Help => write!(output, "{HELP}")?,
                Input::Board => show_board = true,
                Input::ShowFen => writeln!(output, "{}", self.position)?,
                Input::SetFen(fen) => match self.position.set_fen(fen) {
                    Ok(()) => {
                        let fen = self.position.to_fen();
                        self.channel.talk(&position_command(&fen))?;
                        self.record.restart(&fen);
                        writeln!(output, "Board position set.")?;
                        show_board = true;
                    }
                    Err(e) => writeln!(output, "Rejected: {e}")?,
                },
                Input::Move(text) => match self.human_move(text) {
                    Ok(mv) => {
                        debug!(%mv, fen = %self.position, "human move applied");
                        show_board = true;
                    }
                    Err(e @ PositionError::Validation(_)) => {
                        return Err(e).context("engine legality check failed");
                    }
                    Err(e) => writeln!(output, "Rejected: {e}")?,
                },
            }
        }
    }

    fn human_move(&mut self, text: &str) -> Result<CoordMove, PositionError> {
        let mv: CoordMove = text.parse()?;
        if self.validate_moves {
            let mut validator = EnginePerftValidator::new(&mut *self.channel);
            self.position.apply_move_checked(mv, Some(&mut validator))?;
        } else {
            self.position.apply_move(mv);
        }
        self.record.push(Mover::Human, text, self.position.to_fen());
        Ok(mv)
    }

    /// Sends the position, asks for a move and applies it.
    /// `None` means the engine has nothing to play.
    fn engine_turn(&mut self) -> Result<Option<CoordMove>> {
        let fen = self.position.to_fen();
        self.channel.talk(&position_command(&fen))?;
        let reply = self.channel.talk(&go_depth_command(self.depth))?;
        if is_unknown_command(&reply) {
            bail!("engine rejected the search: {reply}");
        }
        let best = parse_bestmove(&reply)
            .ok_or_else(|| anyhow!("expected a bestmove line, engine said: {reply}"))?;
        if best.is_null() {
            return Ok(None);
        }

        // Promotion suffixes are not modelled
        let text = best
            .mv
            .get(..4)
            .ok_or_else(|| anyhow!("engine sent unusable move '{}'", best.mv))?;
        if best.mv.len() > 4 {
            warn!(mv = best.mv, "dropping promotion suffix from engine move");
        }
        let mv: CoordMove = text
            .parse()
            .with_context(|| format!("engine sent unusable move '{}'", best.mv))?;

        self.position.apply_move(mv);
        self.record.push(Mover::Engine, text, self.position.to_fen());
        debug!(%mv, fen = %self.position, "engine move applied");
        Ok(Some(mv))
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
