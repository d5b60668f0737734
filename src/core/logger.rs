//! Main logger implementation

use super::{
    appender::Appender,
    encoder::{EncoderConfig, JsonEncoder},
    error::{LoggerError, Result},
    field::Field,
    log_entry::{Caller, LogEntry},
    log_level::{AtomicLevel, LogLevel},
    metrics::LoggerMetrics,
};
use parking_lot::Mutex;
use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe, Location};
use std::sync::Arc;

/// Exit status used by [`Logger::fatal`]
pub const FATAL_EXIT_CODE: i32 = 1;

/// One output destination plus the last write error it reported.
///
/// The error is kept until the next [`Logger::sync`] so that a failed write
/// is visible to whoever flushes, even though the logging call itself never
/// reports it.
struct SinkSlot {
    appender: Box<dyn Appender>,
    pending_error: Option<LoggerError>,
}

struct LoggerCore {
    level: AtomicLevel,
    encoder: JsonEncoder,
    sinks: Vec<Mutex<SinkSlot>>,
    development: bool,
    stacktrace_level: Option<LogLevel>,
    metrics: LoggerMetrics,
}

impl LoggerCore {
    /// Write one encoded line to every sink with per-appender panic isolation.
    ///
    /// Each sink is locked for the whole line, so concurrent records never
    /// interleave inside a sink.
    fn write_line(&self, line: &[u8]) {
        let mut has_error = false;

        for (idx, sink) in self.sinks.iter().enumerate() {
            let mut slot = sink.lock();
            let append_result =
                catch_unwind(AssertUnwindSafe(|| slot.appender.append(line)));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Appender #{} ({}) failed: {}",
                        idx,
                        slot.appender.name(),
                        e
                    );
                    slot.pending_error = Some(e);
                    has_error = true;
                }
                Err(panic_info) => {
                    let panic_msg = panic_message(panic_info.as_ref());
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} ({}) panicked: {}. \
                         Other appenders continue to function.",
                        idx,
                        slot.appender.name(),
                        panic_msg
                    );
                    slot.pending_error = Some(LoggerError::appender_panicked(
                        slot.appender.name(),
                        panic_msg,
                    ));
                    has_error = true;
                }
            }
        }

        if has_error {
            self.metrics.record_write_failure();
        } else {
            self.metrics.record_logged();
        }
    }

    fn sync(&self) -> Result<()> {
        let mut first_error = None;

        for sink in &self.sinks {
            let mut slot = sink.lock();
            let pending = slot.pending_error.take();
            let flushed = slot.flush();

            let outcome = match pending {
                Some(e) => Err(e),
                None => flushed,
            };
            if let Err(e) = outcome {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
    /// Flush every sink without consuming pending errors.
    ///
    /// A flush failure is reported on stderr and kept for the next sync.
    fn flush_all(&self) {
        for (idx, sink) in self.sinks.iter().enumerate() {
            let mut slot = sink.lock();
            if let Err(e) = slot.flush() {
                eprintln!(
                    "[LOGGER ERROR] Appender #{} ({}) failed to flush: {}",
                    idx,
                    slot.appender.name(),
                    e
                );
                slot.pending_error.get_or_insert(e);
            }
        }
    }
}

impl SinkSlot {
    fn flush(&mut self) -> Result<()> {
        match catch_unwind(AssertUnwindSafe(|| self.appender.flush())) {
            Ok(result) => result,
            Err(panic_info) => Err(LoggerError::appender_panicked(
                self.appender.name(),
                format!("during flush: {}", panic_message(panic_info.as_ref())),
            )),
        }
    }
}

impl Drop for LoggerCore {
    fn drop(&mut self) {
        if let Err(e) = self.sync() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }
    }
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// JSON logger fanning every record out to a fixed set of appenders.
///
/// Cloning is cheap and every clone, as well as every child created with
/// [`Logger::named`] or [`Logger::with`], shares the same appenders, level and
/// metrics.
///
/// # Example
///
/// ```
/// use rust_log_facade::prelude::*;
///
/// let sink = MemoryAppender::new();
/// let logger = Logger::builder()
///     .min_level(LogLevel::Info)
///     .appender(sink.clone())
///     .build();
///
/// logger.info("cache warmed", [Field::int("entries", 512)]);
/// logger.debug("not written", []);
///
/// assert_eq!(sink.lines().len(), 1);
/// ```
#[derive(Clone)]
pub struct Logger {
    core: Arc<LoggerCore>,
    name: String,
    fields: Vec<Field>,
}

impl Logger {
    /// A logger with no appenders at the default `info` level.
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Child logger whose name gets `name` appended with a `.` separator.
    #[must_use]
    pub fn named(&self, name: &str) -> Logger {
        let mut child = self.clone();
        if !name.is_empty() {
            child.name = if self.name.is_empty() {
                name.to_string()
            } else {
                format!("{}.{}", self.name, name)
            };
        }
        child
    }

    /// Child logger that adds `fields` to every record it emits.
    #[must_use]
    pub fn with(&self, fields: impl IntoIterator<Item = Field>) -> Logger {
        let mut child = self.clone();
        child.fields.extend(fields);
        child
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        self.core.level.level()
    }

    /// Change the minimum level for this logger and everything sharing its core.
    pub fn set_level(&self, level: LogLevel) {
        self.core.level.set_level(level);
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        self.core.level.enabled(level)
    }

    pub fn is_development(&self) -> bool {
        self.core.development
    }

    /// Get the logger metrics for detailed observability
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.core.metrics
    }

    /// Flush every appender.
    ///
    /// Returns the first error met, which is either a flush failure or a
    /// write failure recorded since the previous sync. All appenders are
    /// flushed even when an earlier one fails.
    pub fn sync(&self) -> Result<()> {
        self.core.sync()
    }

    #[track_caller]
    pub fn log(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        fields: impl IntoIterator<Item = Field>,
    ) {
        let caller = Caller::from_location(Location::caller());
        self.emit(caller, level, message.into(), fields);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.log(LogLevel::Debug, message, fields);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.log(LogLevel::Info, message, fields);
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.log(LogLevel::Warn, message, fields);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.log(LogLevel::Error, message, fields);
    }

    /// Log at `dpanic`, then panic if the logger is in development mode.
    #[track_caller]
    pub fn dpanic(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        let caller = Caller::from_location(Location::caller());
        let message = message.into();
        self.emit(caller, LogLevel::DPanic, message.clone(), fields);
        if self.core.development {
            self.core.flush_all();
            panic!("{}", message);
        }
    }

    /// Log at `panic`, flush, then panic with the message.
    ///
    /// The panic happens even when the level gate drops the record. Earlier
    /// buffered records are flushed either way, since an unwinding panic may
    /// end the process without dropping a global logger.
    #[track_caller]
    pub fn panic(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) -> ! {
        let caller = Caller::from_location(Location::caller());
        let message = message.into();
        self.emit(caller, LogLevel::Panic, message.clone(), fields);
        self.core.flush_all();
        panic!("{}", message);
    }

    /// Log at `fatal`, flush, then exit the process with [`FATAL_EXIT_CODE`].
    ///
    /// The exit happens even when the level gate drops the record.
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) -> ! {
        let caller = Caller::from_location(Location::caller());
        self.emit(caller, LogLevel::Fatal, message.into(), fields);
        if let Err(e) = self.sync() {
            eprintln!("[LOGGER ERROR] Failed to flush before exit: {}", e);
        }
        std::process::exit(FATAL_EXIT_CODE);
    }

    fn emit(
        &self,
        caller: Caller,
        level: LogLevel,
        message: String,
        fields: impl IntoIterator<Item = Field>,
    ) {
        let core = &self.core;
        if !core.level.enabled(level) {
            core.metrics.record_filtered();
            return;
        }

        let fields = fields.into_iter();
        let mut all_fields = Vec::with_capacity(self.fields.len() + fields.size_hint().0);
        all_fields.extend(self.fields.iter().cloned());
        all_fields.extend(fields);

        let mut entry = LogEntry::new(level, message)
            .with_logger_name(self.name.clone())
            .with_caller(caller)
            .with_fields(all_fields);

        if core.stacktrace_level.is_some_and(|min| level >= min) {
            entry = entry.with_stacktrace(Backtrace::force_capture().to_string());
        }

        match core.encoder.encode(&entry) {
            Ok(line) => core.write_line(&line),
            Err(e) => {
                eprintln!("[LOGGER ERROR] Failed to encode log entry: {}", e);
                core.metrics.record_encode_failure();
            }
        }

        // Records above `error` reach every sink before the caller goes on
        if level > LogLevel::Error {
            core.flush_all();
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let appenders: Vec<String> = self
            .core
            .sinks
            .iter()
            .map(|sink| sink.lock().appender.name().to_string())
            .collect();
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("development", &self.core.development)
            .field("appenders", &appenders)
            .field("fields", &self.fields.len())
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_log_facade::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .appender(ConsoleAppender::stdout())
///     .development(true)
///     .stacktrace_level(Some(LogLevel::Error))
///     .name("worker")
///     .build();
/// assert_eq!(logger.name(), "worker");
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    appenders: Vec<Box<dyn Appender>>,
    encoder: EncoderConfig,
    development: bool,
    stacktrace_level: Option<LogLevel>,
    name: String,
    fields: Vec<Field>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            appenders: Vec::new(),
            encoder: EncoderConfig::default(),
            development: false,
            stacktrace_level: None,
            name: String::new(),
            fields: Vec::new(),
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Add an appender
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    /// Add an already boxed appender
    #[must_use = "builder methods return a new value"]
    pub fn boxed_appender(mut self, appender: Box<dyn Appender>) -> Self {
        self.appenders.push(appender);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn encoder(mut self, config: EncoderConfig) -> Self {
        self.encoder = config;
        self
    }

    /// Development mode makes [`Logger::dpanic`] panic after logging.
    #[must_use = "builder methods return a new value"]
    pub fn development(mut self, enabled: bool) -> Self {
        self.development = enabled;
        self
    }

    /// Attach a stacktrace to records at or above `level`; `None` disables it.
    ///
    /// Each such record captures a full backtrace, which costs far more than
    /// encoding the record itself. With `Some(LogLevel::Error)` a hot error
    /// path pays that on every call; raise the threshold to
    /// `Some(LogLevel::DPanic)` where that matters.
    #[must_use = "builder methods return a new value"]
    pub fn stacktrace_level(mut self, level: Option<LogLevel>) -> Self {
        self.stacktrace_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Fields added to every record
    #[must_use = "builder methods return a new value"]
    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let sinks = self
            .appenders
            .into_iter()
            .map(|appender| {
                Mutex::new(SinkSlot {
                    appender,
                    pending_error: None,
                })
            })
            .collect();

        Logger {
            core: Arc::new(LoggerCore {
                level: AtomicLevel::new(self.min_level),
                encoder: JsonEncoder::new(self.encoder),
                sinks,
                development: self.development,
                stacktrace_level: self.stacktrace_level,
                metrics: LoggerMetrics::new(),
            }),
            name: self.name,
            fields: self.fields,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
