//! Process-wide logger and the free functions that write through it.
//!
//! The first call to any function here builds the logger from
//! [`FacadeConfig::default`] unless [`init`] or [`set_global`] ran earlier.
//! If the default log file cannot be opened the logger falls back to stdout
//! only and says so on stderr.
//!
//! Statics are never dropped, so call [`sync`] before the process exits to
//! get buffered file output onto disk. Records above `error` flush every
//! output on their own, so [`dpanic`], [`panic`] and [`fatal`] need no sync.
//!
//! ```no_run
//! use rust_log_facade::{self as log, Field};
//!
//! log::info("service started", [Field::int("port", 8080)]);
//! log::warn("cache miss", []);
//! log::sync().ok();
//! ```

use crate::config::FacadeConfig;
use crate::core::{Field, FieldValue, Logger, LoggerError, Result};
use std::collections::HashMap;
use std::sync::OnceLock;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Build the process-wide logger from `config`.
///
/// Fails with [`LoggerError::AlreadyInitialized`] once a logger is installed,
/// including the lazily built default.
pub fn init(config: FacadeConfig) -> Result<()> {
    if GLOBAL.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }
    set_global(config.build_logger()?)
}

/// Install an already built logger as the process-wide one.
pub fn set_global(logger: Logger) -> Result<()> {
    GLOBAL
        .set(logger)
        .map_err(|_| LoggerError::AlreadyInitialized)
}

pub fn is_initialized() -> bool {
    GLOBAL.get().is_some()
}

/// The process-wide logger, built with the default configuration on first use.
pub fn global() -> &'static Logger {
    GLOBAL.get_or_init(default_logger)
}

fn default_logger() -> Logger {
    let config = FacadeConfig::default();
    match config.build_logger() {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!(
                "[LOGGER ERROR] Failed to open log file: {}. Falling back to stdout only.",
                e
            );
            config
                .console_only()
                .build_logger()
                .unwrap_or_else(|_| Logger::new())
        }
    }
}

#[inline]
#[track_caller]
pub fn debug(message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
    global().debug(message, fields);
}

#[inline]
#[track_caller]
pub fn info(message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
    global().info(message, fields);
}

#[inline]
#[track_caller]
pub fn warn(message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
    global().warn(message, fields);
}

#[inline]
#[track_caller]
pub fn error(message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
    global().error(message, fields);
}

/// Log at `dpanic`; panics afterwards when the logger is in development mode.
#[inline]
#[track_caller]
pub fn dpanic(message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
    global().dpanic(message, fields);
}

/// Log at `panic`, then panic.
#[inline]
#[track_caller]
pub fn panic(message: impl Into<String>, fields: impl IntoIterator<Item = Field>) -> ! {
    global().panic(message, fields)
}

/// Log at `fatal`, flush every output, then exit with status 1.
#[inline]
#[track_caller]
pub fn fatal(message: impl Into<String>, fields: impl IntoIterator<Item = Field>) -> ! {
    global().fatal(message, fields)
}

/// Flush every output of the process-wide logger.
pub fn sync() -> Result<()> {
    global().sync()
}

/// Turn a map into fields, one per entry, keeping every key and value as is.
///
/// Order follows the map's iteration order.
///
/// ```
/// use std::collections::HashMap;
/// use rust_log_facade::map2fields;
///
/// let mut map = HashMap::new();
/// map.insert("user", "alice");
/// map.insert("role", "admin");
///
/// let fields = map2fields(map);
/// assert_eq!(fields.len(), 2);
/// ```
pub fn map2fields<K, V, S>(map: HashMap<K, V, S>) -> Vec<Field>
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    let mut fields = Vec::with_capacity(map.len());
    for (key, value) in map {
        fields.push(Field::new(key, value));
    }
    fields
}

/// Same as [`map2fields`] for a JSON object.
pub fn json_map2fields(map: &serde_json::Map<String, serde_json::Value>) -> Vec<Field> {
    map.iter()
        .map(|(key, value)| Field::new(key.as_str(), value.clone()))
        .collect()
}
