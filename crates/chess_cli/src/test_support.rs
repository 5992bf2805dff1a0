//! Scripted engine streams shared by the unit tests.

use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

use engine_channel::EngineChannel;

/// Records every command written to the engine.
#[derive(Clone, Default)]
pub struct SentLines(Arc<Mutex<Vec<u8>>>);

impl SentLines {
    pub fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for SentLines {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An engine whose whole output is known up front. Once `output` is used
/// up the stream reports end of file.
pub fn scripted_engine(output: &str) -> (EngineChannel, SentLines) {
    let sent = SentLines::default();
    let reader = Cursor::new(output.as_bytes().to_vec());
    let channel = EngineChannel::from_streams(reader, sent.clone(), "scripted");
    (channel, sent)
}
