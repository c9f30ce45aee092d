//! Test utilities for tally-core
//!
//! This module provides a scripted [`LineInput`] that can be used to drive review
//! sessions in unit and integration tests without a terminal.

use std::collections::VecDeque;
use std::io;

use crate::error::{Error, Result};
use crate::tuning::LineInput;

/// Line input that replays a fixed script and records everything shown
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
    shown: Vec<String>,
    close_count: usize,
    fail_when_exhausted: bool,
}

impl ScriptedInput {
    /// Script the given lines; once they run out, `ask` reports closed input
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Fail with an I/O error instead of reporting closed input when the script
    /// runs out
    pub fn failing_when_exhausted(mut self) -> Self {
        self.fail_when_exhausted = true;
        self
    }

    /// Prompts passed to `ask`, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Messages passed to `show`, in order
    pub fn shown(&self) -> &[String] {
        &self.shown
    }

    /// All shown messages joined with newlines
    pub fn transcript(&self) -> String {
        self.shown.join("\n")
    }

    /// How many times `close` was called
    pub fn close_count(&self) -> usize {
        self.close_count
    }

    /// Lines not consumed yet
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineInput for ScriptedInput {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        match self.lines.pop_front() {
            Some(line) => Ok(Some(line)),
            None if self.fail_when_exhausted => Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "scripted input exhausted",
            ))),
            None => Ok(None),
        }
    }

    fn show(&mut self, text: &str) {
        self.shown.push(text.to_string());
    }

    fn close(&mut self) {
        self.close_count += 1;
    }
}
