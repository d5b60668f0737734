//! Appender implementations

pub mod console;
pub mod memory;
pub mod rotating_file;

pub use console::{ConsoleAppender, ConsoleTarget};
pub use memory::MemoryAppender;
pub use rotating_file::{RotatingFileAppender, RotationPolicy};

// Re-export trait for convenience
pub use crate::core::Appender;
