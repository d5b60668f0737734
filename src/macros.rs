//! Logging macros for ergonomic log message formatting.
//!
//! These macros format the message like `format!` and pass it to an explicit
//! logger. Fields go in a bracketed list before the format string.
//!
//! # Examples
//!
//! ```
//! use rust_log_facade::prelude::*;
//! use rust_log_facade::{fields, info};
//!
//! let logger = Logger::builder().appender(MemoryAppender::new()).build();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // With fields
//! info!(logger, [Field::int("port", port)], "listening");
//!
//! // Fields built from pairs
//! logger.info("login", fields! { "user" => "alice", "attempt" => 2 });
//! ```

/// Build a `Vec<Field>` from `key => value` pairs.
///
/// ```
/// use rust_log_facade::{fields, Field};
///
/// let fields = fields! { "user" => "alice", "retries" => 3 };
/// assert_eq!(fields[0], Field::string("user", "alice"));
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let fields: ::std::vec::Vec<$crate::Field> =
            ::std::vec![$($crate::Field::new($key, $value)),*];
        fields
    }};
}

/// Log a message at a given level with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::builder().appender(MemoryAppender::new()).build();
/// use rust_log_facade::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Warn, [Field::bool("retry", true)], "Timed out");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, [$($field:expr),* $(,)?], $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), [$($field),*])
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), [])
    };
}

/// Log a debug-level message.
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::builder().appender(MemoryAppender::new()).build();
/// use rust_log_facade::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a dpanic-level message; panics afterwards in development mode.
#[macro_export]
macro_rules! dpanic {
    ($logger:expr, [$($field:expr),* $(,)?], $($arg:tt)+) => {
        $logger.dpanic(format!($($arg)+), [$($field),*])
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.dpanic(format!($($arg)+), [])
    };
}

/// Log a fatal-level message, flush and exit the process.
///
/// ```no_run
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::new();
/// use rust_log_facade::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, [$($field:expr),* $(,)?], $($arg:tt)+) => {
        $logger.fatal(format!($($arg)+), [$($field),*])
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(format!($($arg)+), [])
    };
}
