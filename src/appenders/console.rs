//! Console appender implementation

use crate::core::{Appender, LoggerError, Result};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

/// Writes encoded lines to standard output or standard error.
///
/// The standard stream lock is held for the whole line, so output from other
/// threads printing directly to the same stream cannot split a record.
pub struct ConsoleAppender {
    target: ConsoleTarget,
}

impl ConsoleAppender {
    pub fn new(target: ConsoleTarget) -> Self {
        Self { target }
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleTarget::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(ConsoleTarget::Stderr)
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, line: &[u8]) -> Result<()> {
        let written = match self.target {
            ConsoleTarget::Stdout => std::io::stdout().lock().write_all(line),
            ConsoleTarget::Stderr => std::io::stderr().lock().write_all(line),
        };
        written.map_err(|e| LoggerError::io_operation("writing to console", self.name(), e))
    }

    fn flush(&mut self) -> Result<()> {
        match self.target {
            ConsoleTarget::Stdout => std::io::stdout().flush()?,
            ConsoleTarget::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.target {
            ConsoleTarget::Stdout => "stdout",
            ConsoleTarget::Stderr => "stderr",
        }
    }
}
