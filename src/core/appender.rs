//! Appender trait for log output destinations

use super::error::Result;

/// A byte sink that receives fully encoded log lines.
///
/// Each call to [`Appender::append`] carries exactly one record including its
/// line ending. The logger serializes calls per appender, so implementations
/// only need `&mut self` access.
pub trait Appender: Send + Sync {
    fn append(&mut self, line: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
