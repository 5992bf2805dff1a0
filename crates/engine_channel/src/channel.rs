//! Blocking request/response channel to one UCI engine.

use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::error::{EngineError, EngineResult};
use crate::protocol::{self, is_silent_command, is_terminator};

/// Time allowed for the engine to exit after `quit` before it is killed.
pub const ENGINE_QUIT_TIMEOUT: Duration = Duration::from_millis(300);
const ENGINE_QUIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How to start an engine process.
#[derive(Debug, Clone)]
pub struct EngineCommand {
    pub path: PathBuf,
    pub args: Vec<String>,
    /// Bound on the whole of each response; `None` waits forever
    pub read_timeout: Option<Duration>,
}

impl EngineCommand {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            read_timeout: None,
        }
    }
}

/// What the engine reported about itself during the `uci` handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineInfo {
    pub name: Option<String>,
    pub author: Option<String>,
    pub options: Vec<String>,
}

impl EngineInfo {
    /// UCI option names are case-insensitive.
    pub fn has_option(&self, name: &str) -> bool {
        self.options.iter().any(|o| o.eq_ignore_ascii_case(name))
    }
}

/// A half-duplex text channel to an engine.
///
/// Output lines are pumped by a background thread into an mpsc queue, so a
/// read never touches a partial buffer and a closed stream shows up as a
/// disconnected queue. Commands are only ever written from the owning
/// thread, one response at a time.
pub struct EngineChannel {
    writer: Box<dyn Write + Send>,
    rx: Receiver<String>,
    child: Option<Child>,
    read_timeout: Option<Duration>,
    label: String,
}

impl EngineChannel {
    pub fn spawn(cmd: &EngineCommand) -> EngineResult<Self> {
        let label = cmd
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| cmd.path.display().to_string());

        let mut child = Command::new(&cmd.path)
            .args(&cmd.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: cmd.path.clone(),
                source,
            })?;
        let stdin = child.stdin.take().ok_or_else(|| EngineError::MissingPipe {
            label: label.clone(),
            pipe: "stdin",
        })?;
        let stdout = child.stdout.take().ok_or_else(|| EngineError::MissingPipe {
            label: label.clone(),
            pipe: "stdout",
        })?;
        debug!(engine = %label, path = %cmd.path.display(), "spawned engine");

        let mut channel = Self::from_streams(BufReader::new(stdout), BufWriter::new(stdin), label);
        channel.child = Some(child);
        channel.read_timeout = cmd.read_timeout;
        Ok(channel)
    }

    /// Attaches to an existing pair of streams instead of a child process.
    pub fn from_streams<R, W>(reader: R, writer: W, label: impl Into<String>) -> Self
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
    {
        let label = label.into();
        let (tx, rx) = mpsc::channel::<String>();
        let reader_label = label.clone();
        std::thread::spawn(move || pump_lines(reader, tx, &reader_label));

        Self {
            writer: Box::new(writer),
            rx,
            child: None,
            read_timeout: None,
            label,
        }
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Writes one command line and flushes it.
    pub fn send(&mut self, command: &str) -> EngineResult<()> {
        debug!(engine = %self.label, ">> {command}");
        let io_err = |source| EngineError::Io {
            label: self.label.clone(),
            source,
        };
        self.writer.write_all(command.as_bytes()).map_err(io_err)?;
        self.writer.write_all(b"\n").map_err(io_err)?;
        self.writer.flush().map_err(io_err)
    }

    /// Reads until a terminator line and returns that line.
    pub fn read_response(&mut self) -> EngineResult<String> {
        let mut transcript = self.read_transcript()?;
        // read_transcript only returns once a terminator has been pushed
        Ok(transcript.pop().unwrap_or_default())
    }

    /// Reads until a terminator line and returns every line, terminator last.
    ///
    /// The read timeout bounds the whole response, not each line, so an
    /// engine that keeps printing `info` without finishing still times out.
    pub fn read_transcript(&mut self) -> EngineResult<Vec<String>> {
        let deadline = self.read_timeout.map(|t| (Instant::now() + t, t));
        let mut lines = Vec::new();
        loop {
            let line = self.recv_line(deadline)?;
            let done = is_terminator(&line);
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }

    /// Sends `command` and returns the terminator line of the reply.
    ///
    /// `position`, `ucinewgame` and `setoption` get no reply from a UCI
    /// engine, so for those this returns an empty string without reading.
    pub fn talk(&mut self, command: &str) -> EngineResult<String> {
        self.send(command)?;
        if is_silent_command(command) {
            return Ok(String::new());
        }
        self.read_response()
    }

    /// Same as [`EngineChannel::talk`] but keeps every line of the reply.
    pub fn talk_transcript(&mut self, command: &str) -> EngineResult<Vec<String>> {
        self.send(command)?;
        if is_silent_command(command) {
            return Ok(Vec::new());
        }
        self.read_transcript()
    }

    /// `uci` handshake. Collects identification and option names until `uciok`.
    pub fn handshake(&mut self) -> EngineResult<EngineInfo> {
        let mut engine_info = EngineInfo::default();
        let mut lines = self.talk_transcript("uci")?;
        loop {
            for line in &lines {
                if let Some(name) = line.strip_prefix("id name ") {
                    engine_info.name = Some(name.trim().to_string());
                } else if let Some(author) = line.strip_prefix("id author ") {
                    engine_info.author = Some(author.trim().to_string());
                } else if let Some(rest) = line.strip_prefix("option ") {
                    if let Some(name) = protocol::parse_option_name(rest) {
                        engine_info.options.push(name);
                    }
                }
            }
            match lines.last() {
                Some(last) if last.starts_with("uciok") => break,
                Some(last) => warn!(engine = %self.label, "unexpected line during handshake: {last}"),
                None => {}
            }
            lines = self.read_transcript()?;
        }
        info!(
            engine = %self.label,
            name = engine_info.name.as_deref().unwrap_or("?"),
            options = engine_info.options.len(),
            "engine identified"
        );
        Ok(engine_info)
    }

    /// `isready` round trip. Anything before `readyok` is discarded.
    pub fn ensure_ready(&mut self) -> EngineResult<()> {
        let mut line = self.talk("isready")?;
        while !line.starts_with("readyok") {
            debug!(engine = %self.label, "discarding stale response: {line}");
            line = self.read_response()?;
        }
        Ok(())
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> EngineResult<()> {
        self.talk(&protocol::set_option_command(name, value))?;
        Ok(())
    }

    pub fn new_game(&mut self) -> EngineResult<()> {
        self.talk("ucinewgame")?;
        self.ensure_ready()
    }

    fn recv_line(&mut self, deadline: Option<(Instant, Duration)>) -> EngineResult<String> {
        let line = match deadline {
            Some((deadline, timeout)) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                self.rx.recv_timeout(remaining).map_err(|e| match e {
                    RecvTimeoutError::Timeout => EngineError::Timeout {
                        label: self.label.clone(),
                        timeout,
                    },
                    RecvTimeoutError::Disconnected => EngineError::Disconnected {
                        label: self.label.clone(),
                    },
                })?
            }
            None => self.rx.recv().map_err(|_| EngineError::Disconnected {
                label: self.label.clone(),
            })?,
        };
        trace!(engine = %self.label, "<< {line}");
        Ok(line)
    }
}

/// Forwards engine output line by line until the stream ends or the
/// channel is dropped. Bytes that are not UTF-8 are replaced, not fatal.
fn pump_lines<R: BufRead>(mut reader: R, tx: Sender<String>, label: &str) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(engine = %label, error = %e, "failed to read engine output");
                break;
            }
        }
    }
}

impl Drop for EngineChannel {
    fn drop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        let _ = self.send("quit");
        let deadline = Instant::now() + ENGINE_QUIT_TIMEOUT;
        while Instant::now() < deadline {
            if let Ok(Some(_)) = child.try_wait() {
                return;
            }
            std::thread::sleep(ENGINE_QUIT_POLL_INTERVAL);
        }
        debug!(engine = %self.label, "engine ignored quit, killing it");
        let _ = child.kill();
        let _ = child.wait();
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod channel_tests;
