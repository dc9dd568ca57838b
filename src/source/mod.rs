//! Line sources feeding a session: background readers for live streams and a
//! whole-file loader for bulk loads.

pub mod framer;

use anyhow::{Context, Result};
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

pub use framer::LineFramer;

/// Size of each read from a live source
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Events emitted by a line source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// A complete line arrived
    Line(String),
    /// The transport reported a problem
    Error(String),
    /// The source ended
    Closed,
}

/// Receiver side of a line source.
pub trait LineSink: Send + 'static {
    /// Deliver one line. Returns `false` once the receiver is gone, which
    /// stops the reader.
    fn on_line(&self, line: String) -> bool;

    fn on_error(&self, message: String);

    fn on_closed(&self);
}

impl LineSink for Sender<SourceEvent> {
    fn on_line(&self, line: String) -> bool {
        self.send(SourceEvent::Line(line)).is_ok()
    }

    fn on_error(&self, message: String) {
        let _ = self.send(SourceEvent::Error(message));
    }

    fn on_closed(&self) {
        let _ = self.send(SourceEvent::Closed);
    }
}

/// Spawn a background thread that reads `reader` in chunks, frames them into
/// lines and hands every line to `sink`.
///
/// A read error is reported through `on_error` and ends the stream. At the end
/// any unterminated remainder is delivered as a last line, then `on_closed`
/// fires.
pub fn spawn_line_source<R, S>(mut reader: R, mut framer: LineFramer, sink: S) -> JoinHandle<()>
where
    R: Read + Send + 'static,
    S: LineSink,
{
    thread::spawn(move || {
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    for line in framer.feed(&buf[..n]) {
                        if !sink.on_line(line) {
                            // Receiver dropped, stop reading
                            return;
                        }
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "line source read failed");
                    sink.on_error(e.to_string());
                    break;
                }
            }
        }

        if let Some(rest) = framer.finish() {
            if !sink.on_line(rest) {
                return;
            }
        }
        sink.on_closed();
    })
}

/// Read a whole file as lines for a bulk load.
///
/// Uses the same framing as live sources: `\r\n` endings are stripped, a
/// final line without terminator is kept, and invalid UTF-8 is replaced.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut framer = LineFramer::new();
    let mut lines: Vec<String> = framer.feed(&bytes).collect();
    lines.extend(framer.finish());
    Ok(lines)
}
