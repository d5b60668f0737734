//! In-memory appender
//!
//! Keeps every line it receives. Clones share the same buffer, so a test can
//! hand one clone to a logger and inspect the other.

use crate::core::{Appender, Result};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct MemoryAppender {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryAppender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured lines without their line endings
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Captured lines parsed as JSON; lines that do not parse are skipped
    pub fn json_records(&self) -> Vec<serde_json::Value> {
        self.lines
            .lock()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Appender for MemoryAppender {
    fn append(&mut self, line: &[u8]) -> Result<()> {
        let text = String::from_utf8_lossy(line);
        self.lines
            .lock()
            .push(text.trim_end_matches(['\r', '\n']).to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
