//! JSON line encoding for log entries
//!
//! Every entry becomes one JSON object on a single line. Member names and the
//! rendering of levels, timestamps, durations, callers and logger names are
//! controlled by [`EncoderConfig`].

use super::error::Result;
use super::field::{Field, FieldValue};
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the level member is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelEncoding {
    /// `info`, `warn`, ...
    #[default]
    Lowercase,
    /// `INFO`, `WARN`, ...
    Uppercase,
}

impl LevelEncoding {
    pub fn encode(&self, level: LogLevel) -> &'static str {
        match self {
            LevelEncoding::Lowercase => level.to_str(),
            LevelEncoding::Uppercase => level.to_uppercase_str(),
        }
    }
}

/// How the time member is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeEncoding {
    /// ISO 8601 in UTC with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// RFC 3339 with nanoseconds: `2025-01-08T10:30:45.123456789Z`
    Rfc3339,

    /// Floating point seconds since the Unix epoch: `1736332245.123456`
    EpochSeconds,

    /// Floating point milliseconds since the Unix epoch: `1736332245123.456`
    EpochMillis,

    /// Integer nanoseconds since the Unix epoch
    EpochNanos,
}

impl TimeEncoding {
    #[must_use]
    pub fn encode(&self, datetime: &DateTime<Utc>) -> serde_json::Value {
        let nanos = f64::from(datetime.timestamp_subsec_nanos());
        match self {
            TimeEncoding::Iso8601 => {
                serde_json::Value::String(datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
            }
            TimeEncoding::Rfc3339 => {
                serde_json::Value::String(datetime.to_rfc3339_opts(SecondsFormat::Nanos, true))
            }
            TimeEncoding::EpochSeconds => {
                let secs = datetime.timestamp() as f64 + nanos / 1e9;
                serde_json::json!(secs)
            }
            TimeEncoding::EpochMillis => {
                let millis = datetime.timestamp() as f64 * 1e3 + nanos / 1e6;
                serde_json::json!(millis)
            }
            TimeEncoding::EpochNanos => {
                serde_json::json!(datetime.timestamp_nanos_opt().unwrap_or_default())
            }
        }
    }
}

/// How [`FieldValue::Duration`] values are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationEncoding {
    /// Floating point seconds
    #[default]
    Seconds,
    /// Floating point milliseconds
    Millis,
    /// Integer nanoseconds
    Nanos,
    /// Human readable text such as `1.5s`
    Text,
}

impl DurationEncoding {
    #[must_use]
    pub fn encode(&self, duration: &Duration) -> serde_json::Value {
        match self {
            DurationEncoding::Seconds => serde_json::json!(duration.as_secs_f64()),
            DurationEncoding::Millis => serde_json::json!(duration.as_nanos() as f64 / 1e6),
            DurationEncoding::Nanos => {
                serde_json::json!(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
            }
            DurationEncoding::Text => serde_json::Value::String(format!("{:?}", duration)),
        }
    }
}

/// How the call site is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerEncoding {
    /// Path as compiled plus line number
    #[default]
    Full,
    /// Last directory and file name plus line number
    Short,
}

/// How the logger name is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameEncoding {
    /// The full dotted name
    #[default]
    Full,
}

/// Member names and value renderings for the JSON encoder.
///
/// An empty key leaves that member out of every line.
///
/// # Examples
///
/// ```
/// use rust_log_facade::core::{EncoderConfig, LevelEncoding};
///
/// let config = EncoderConfig::default()
///     .with_message_key("message")
///     .with_level_encoding(LevelEncoding::Uppercase);
/// assert_eq!(config.caller_key, "linenum");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub time_key: String,
    pub level_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub message_key: String,
    pub stacktrace_key: String,
    pub line_ending: String,
    pub level_encoding: LevelEncoding,
    pub time_encoding: TimeEncoding,
    pub duration_encoding: DurationEncoding,
    pub caller_encoding: CallerEncoding,
    pub name_encoding: NameEncoding,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            time_key: "time".to_string(),
            level_key: "level".to_string(),
            name_key: "logger".to_string(),
            caller_key: "linenum".to_string(),
            message_key: "msg".to_string(),
            stacktrace_key: "stacktrace".to_string(),
            line_ending: "\n".to_string(),
            level_encoding: LevelEncoding::Lowercase,
            time_encoding: TimeEncoding::Iso8601,
            duration_encoding: DurationEncoding::Seconds,
            caller_encoding: CallerEncoding::Full,
            name_encoding: NameEncoding::Full,
        }
    }
}

impl EncoderConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_time_key(mut self, key: impl Into<String>) -> Self {
        self.time_key = key.into();
        self
    }

    #[must_use]
    pub fn with_level_key(mut self, key: impl Into<String>) -> Self {
        self.level_key = key.into();
        self
    }

    #[must_use]
    pub fn with_name_key(mut self, key: impl Into<String>) -> Self {
        self.name_key = key.into();
        self
    }

    #[must_use]
    pub fn with_caller_key(mut self, key: impl Into<String>) -> Self {
        self.caller_key = key.into();
        self
    }

    #[must_use]
    pub fn with_message_key(mut self, key: impl Into<String>) -> Self {
        self.message_key = key.into();
        self
    }

    #[must_use]
    pub fn with_stacktrace_key(mut self, key: impl Into<String>) -> Self {
        self.stacktrace_key = key.into();
        self
    }

    #[must_use]
    pub fn with_level_encoding(mut self, encoding: LevelEncoding) -> Self {
        self.level_encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_time_encoding(mut self, encoding: TimeEncoding) -> Self {
        self.time_encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_duration_encoding(mut self, encoding: DurationEncoding) -> Self {
        self.duration_encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_caller_encoding(mut self, encoding: CallerEncoding) -> Self {
        self.caller_encoding = encoding;
        self
    }
}

/// Encodes entries as single JSON lines.
#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode one entry, including the trailing line ending.
    ///
    /// Members are written in a fixed order: level, time, logger, caller,
    /// message, fields in the order given, stacktrace.
    pub fn encode(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        let cfg = &self.config;
        let mut out = ObjectWriter::new(Vec::with_capacity(256));

        if !cfg.level_key.is_empty() {
            out.key(&cfg.level_key)?;
            out.raw_json(&cfg.level_encoding.encode(entry.level))?;
        }
        if !cfg.time_key.is_empty() {
            out.key(&cfg.time_key)?;
            out.raw_json(&cfg.time_encoding.encode(&entry.timestamp))?;
        }
        if !cfg.name_key.is_empty() && !entry.logger_name.is_empty() {
            out.key(&cfg.name_key)?;
            let name = match cfg.name_encoding {
                NameEncoding::Full => entry.logger_name.as_str(),
            };
            out.raw_json(name)?;
        }
        if let (false, Some(caller)) = (cfg.caller_key.is_empty(), entry.caller.as_ref()) {
            out.key(&cfg.caller_key)?;
            let rendered = match cfg.caller_encoding {
                CallerEncoding::Full => caller.full(),
                CallerEncoding::Short => caller.short(),
            };
            out.raw_json(&rendered)?;
        }
        if !cfg.message_key.is_empty() {
            out.key(&cfg.message_key)?;
            out.raw_json(&entry.message)?;
        }

        for field in &entry.fields {
            self.write_field(&mut out, field)?;
        }

        if let (false, Some(stack)) = (cfg.stacktrace_key.is_empty(), entry.stacktrace.as_ref()) {
            out.key(&cfg.stacktrace_key)?;
            out.raw_json(stack)?;
        }

        let mut bytes = out.finish();
        bytes.extend_from_slice(cfg.line_ending.as_bytes());
        Ok(bytes)
    }

    fn write_field(&self, out: &mut ObjectWriter, field: &Field) -> Result<()> {
        out.key(&field.key)?;
        self.write_value(out, &field.value)
    }

    fn write_value(&self, out: &mut ObjectWriter, value: &FieldValue) -> Result<()> {
        match value {
            FieldValue::String(s) | FieldValue::Error(s) => out.raw_json(s),
            FieldValue::Int(i) => out.raw_json(i),
            FieldValue::Uint(u) => out.raw_json(u),
            FieldValue::Float(f) => {
                if f.is_finite() {
                    out.raw_json(f)
                } else if f.is_nan() {
                    out.raw_json("NaN")
                } else if f.is_sign_positive() {
                    out.raw_json("+Inf")
                } else {
                    out.raw_json("-Inf")
                }
            }
            FieldValue::Bool(b) => out.raw_json(b),
            FieldValue::Duration(d) => out.raw_json(&self.config.duration_encoding.encode(d)),
            FieldValue::Array(items) => {
                out.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(b',');
                    }
                    self.write_value(out, item)?;
                }
                out.push(b']');
                Ok(())
            }
            FieldValue::Object(fields) => {
                out.open_object();
                for field in fields {
                    self.write_field(out, field)?;
                }
                out.close_object();
                Ok(())
            }
            FieldValue::Null => {
                out.buf.extend_from_slice(b"null");
                Ok(())
            }
        }
    }
}

/// Streams JSON object members into a byte buffer, keeping insertion order.
struct ObjectWriter {
    buf: Vec<u8>,
    /// One entry per open object: whether a member has been written yet
    needs_comma: Vec<bool>,
}

impl ObjectWriter {
    fn new(mut buf: Vec<u8>) -> Self {
        buf.push(b'{');
        Self {
            buf,
            needs_comma: vec![false],
        }
    }

    fn key(&mut self, key: &str) -> Result<()> {
        if let Some(needs_comma) = self.needs_comma.last_mut() {
            if *needs_comma {
                self.buf.push(b',');
            }
            *needs_comma = true;
        }
        serde_json::to_writer(&mut self.buf, key)?;
        self.buf.push(b':');
        Ok(())
    }

    fn raw_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.buf, value)?;
        Ok(())
    }

    fn push(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    fn open_object(&mut self) {
        self.buf.push(b'{');
        self.needs_comma.push(false);
    }

    fn close_object(&mut self) {
        self.needs_comma.pop();
        self.buf.push(b'}');
    }

    fn finish(mut self) -> Vec<u8> {
        self.buf.push(b'}');
        self.buf
    }
}
