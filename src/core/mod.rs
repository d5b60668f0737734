//! Core logger types and traits

pub mod appender;
pub mod encoder;
pub mod error;
pub mod field;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;

pub use appender::Appender;
pub use encoder::{
    CallerEncoding, DurationEncoding, EncoderConfig, JsonEncoder, LevelEncoding, NameEncoding,
    TimeEncoding,
};
pub use error::{LoggerError, Result};
pub use field::{Field, FieldValue};
pub use log_entry::{Caller, LogEntry};
pub use log_level::{AtomicLevel, LogLevel};
pub use logger::{Logger, LoggerBuilder, FATAL_EXIT_CODE};
pub use metrics::LoggerMetrics;
