//! Log entry structure

use super::field::Field;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::panic::Location;

/// Source location of the call that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
}

impl Caller {
    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }

    /// `path/to/file.rs:42`
    pub fn full(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }

    /// Keeps only the last directory and the file name: `core/logger.rs:42`
    pub fn short(&self) -> String {
        let normalized = self.file.replace('\\', "/");
        let mut parts = normalized.rsplitn(3, '/');
        let file = parts.next().unwrap_or_default();
        match parts.next() {
            Some(dir) => format!("{}/{}:{}", dir, file, self.line),
            None => format!("{}:{}", file, self.line),
        }
    }
}

/// One record on its way from a call site to the sinks.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub logger_name: String,
    pub caller: Option<Caller>,
    pub fields: Vec<Field>,
    pub stacktrace: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: String) -> Self {
        Self {
            level,
            message,
            timestamp: Utc::now(),
            logger_name: String::new(),
            caller: None,
            fields: Vec::new(),
            stacktrace: None,
        }
    }

    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_stacktrace(mut self, stacktrace: impl Into<String>) -> Self {
        self.stacktrace = Some(stacktrace.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
