//! # Rust Log Facade
//!
//! Process-wide structured JSON logging. Every record is written as one JSON
//! line to stdout and to a size-rotated, gzip-compressed file.
//!
//! ## Features
//!
//! - **Global Facade**: `info`, `warn`, `error` and friends usable from anywhere
//! - **Structured Fields**: Typed key/value pairs, plus conversion from maps
//! - **Rotating Files**: Size based rotation with backup count and age limits
//! - **Thread Safe**: Whole lines per sink, never interleaved
//!
//! ```no_run
//! use rust_log_facade::{self as log, Field};
//!
//! log::info("request served", [
//!     Field::string("path", "/health"),
//!     Field::int("status", 200),
//! ]);
//! log::sync().ok();
//! ```

pub mod appenders;
pub mod config;
pub mod core;
pub mod facade;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{
        ConsoleAppender, ConsoleTarget, MemoryAppender, RotatingFileAppender, RotationPolicy,
    };
    pub use crate::config::{FacadeConfig, FileSinkConfig};
    pub use crate::core::{
        Appender, AtomicLevel, EncoderConfig, Field, FieldValue, LogLevel, Logger, LoggerBuilder,
        LoggerError, LoggerMetrics, Result,
    };
    pub use crate::fields;
}

pub use appenders::{ConsoleAppender, MemoryAppender, RotatingFileAppender, RotationPolicy};
pub use config::{FacadeConfig, FileSinkConfig};
pub use core::{
    Appender, AtomicLevel, Caller, EncoderConfig, Field, FieldValue, JsonEncoder, LogEntry,
    LogLevel, Logger, LoggerBuilder, LoggerError, LoggerMetrics, Result, FATAL_EXIT_CODE,
};
pub use facade::{
    debug, dpanic, error, fatal, global, info, init, is_initialized, json_map2fields, map2fields,
    panic, set_global, sync, warn,
};
