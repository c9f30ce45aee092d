//! Terminal line input for review sessions

use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};

use tally_core::{LineInput, Result};
use tracing::warn;

/// Line input over a reader/writer pair (stdin/stdout by default)
pub struct TerminalInput<R = StdinLock<'static>, W = Stdout> {
    reader: R,
    writer: W,
    closed: bool,
}

impl TerminalInput {
    /// Input bound to the process's stdin and stdout
    pub fn open() -> Result<Self> {
        let stdin: Stdin = io::stdin();
        Ok(Self::new(stdin.lock(), io::stdout()))
    }
}

impl<R: BufRead, W: Write> TerminalInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Give back the writer (for inspecting output)
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> LineInput for TerminalInput<R, W> {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.closed {
            return Ok(None);
        }

        write!(self.writer, "{}", prompt)?;
        self.writer.flush()?;

        // Undecodable bytes become U+FFFD so the session can reject the line
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }

        let mut line = String::from_utf8_lossy(&buf).into_owned();
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    fn show(&mut self, text: &str) {
        if let Err(e) = writeln!(self.writer, "{}", text) {
            warn!("Failed to write to terminal: {}", e);
        }
    }

    fn close(&mut self) {
        if !self.closed {
            if let Err(e) = self.writer.flush() {
                warn!("Failed to flush terminal output: {}", e);
            }
            self.closed = true;
        }
    }
}
