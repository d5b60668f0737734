//! Rotating file appender with automatic log rotation
//!
//! The active file keeps its configured name. When the next line would push
//! it past the size limit, it is renamed to `<name>.1` (gzipped to
//! `<name>.1.gz` when compression is on), older backups move up one index,
//! and backups beyond the count or age limits are removed.

use crate::core::appender::Appender;
use crate::core::error::{LoggerError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const MEGABYTE: u64 = 1024 * 1024;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for rotating file appender
///
/// # Examples
///
/// ```
/// use rust_log_facade::appenders::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_size_mb(128)
///     .with_max_backups(30)
///     .with_max_age_days(7)
///     .with_compression(true);
/// assert_eq!(policy.max_size_bytes, 128 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size at which the active file is rotated
    pub max_size_bytes: u64,
    /// Maximum number of rotated files to keep; 0 keeps all of them
    pub max_backups: usize,
    /// Rotated files older than this are removed; `None` keeps them forever
    pub max_age: Option<Duration>,
    /// Whether to gzip rotated files
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: 100 * MEGABYTE,
            max_backups: 0,
            max_age: None,
            compress: false,
        }
    }
}

impl RotationPolicy {
    /// Create a new rotation policy with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size_bytes = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size_mb(mut self, megabytes: u64) -> Self {
        self.max_size_bytes = megabytes.saturating_mul(MEGABYTE);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, age: Duration) -> Self {
        self.max_age = Some(age);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age_days(mut self, days: u64) -> Self {
        self.max_age = Some(DAY * u32::try_from(days).unwrap_or(u32::MAX));
        self
    }

    /// Enable compression
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

/// File appender that rotates by size and prunes backups by count and age.
///
/// # Examples
///
/// ```no_run
/// use rust_log_facade::appenders::{RotatingFileAppender, RotationPolicy};
///
/// let policy = RotationPolicy::new()
///     .with_max_size_mb(128)
///     .with_max_backups(30)
///     .with_max_age_days(7)
///     .with_compression(true);
/// let appender = RotatingFileAppender::with_policy("./logs/1.log", policy).unwrap();
/// ```
pub struct RotatingFileAppender {
    base_path: PathBuf,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    last_rotation: SystemTime,
    /// Bytes written through `io::Write` that do not yet end in a newline
    partial_line: Vec<u8>,
}

impl RotatingFileAppender {
    /// Create a new rotating file appender
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Create a new rotating file appender with custom policy
    ///
    /// # Errors
    ///
    /// Returns error if the size limit is zero or the file cannot be created
    /// or opened
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if policy.max_size_bytes == 0 {
            return Err(LoggerError::config(
                "RotationPolicy",
                "max_size_bytes must be greater than zero",
            ));
        }

        // Create parent directory if it doesn't exist
        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size, last_rotation) = Self::open_file(&base_path)?;

        let mut appender = Self {
            base_path,
            policy,
            writer: Some(BufWriter::new(file)),
            current_size,
            last_rotation,
            partial_line: Vec::new(),
        };
        // Backups left by an earlier run age out even if this run never rotates
        appender.prune_backups();
        Ok(appender)
    }

    fn open_file(path: &Path) -> Result<(File, u64, SystemTime)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        let metadata = file.metadata().map_err(|e| {
            LoggerError::file_appender(
                path.display().to_string(),
                format!("Cannot access file metadata: {}", e),
            )
        })?;
        let size = metadata.len();
        let last_rotation = metadata.modified().unwrap_or_else(|_| SystemTime::now());
        Ok((file, size, last_rotation))
    }

    /// Write one record, rotating first if it would not fit.
    ///
    /// # Errors
    ///
    /// Returns an error if the record alone exceeds the size limit or the
    /// write fails. A failed rotation is reported on stderr and writing
    /// continues in the current file.
    pub fn write_record(&mut self, record: &[u8]) -> Result<()> {
        let len = record.len() as u64;
        if len > self.policy.max_size_bytes {
            return Err(LoggerError::record_too_large(
                self.base_path.display().to_string(),
                len,
                self.policy.max_size_bytes,
            ));
        }

        if self.current_size > 0 && self.current_size + len > self.policy.max_size_bytes {
            if let Err(e) = self.rotate() {
                eprintln!(
                    "[WARN] Log rotation failed: {}. Continuing with current file.",
                    e
                );

                if self.writer.is_none() {
                    match Self::open_file(&self.base_path) {
                        Ok((file, size, last_rotation)) => {
                            self.writer = Some(BufWriter::new(file));
                            self.current_size = size;
                            self.last_rotation = last_rotation;
                        }
                        Err(reopen_err) => {
                            eprintln!(
                                "[LOGGER ERROR] Failed to reopen log file after rotation failure: {}",
                                reopen_err
                            );
                            return Err(e);
                        }
                    }
                }

                // Let the file grow past the limit rather than retry on every write
                self.current_size = 0;
            }
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;
        writer.write_all(record).map_err(|e| {
            LoggerError::file_appender(
                self.base_path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;
        self.current_size += len;
        Ok(())
    }

    /// Rotate now, regardless of the current size.
    pub fn rotate(&mut self) -> Result<()> {
        // Explicitly drop writer to release file handle before renaming
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        // Shift existing backups up by one, highest index first
        for index in self.backup_indices().into_iter().rev() {
            for compressed in [true, false] {
                let old_path = self.backup_path(index, compressed);
                if !old_path.exists() {
                    continue;
                }
                let new_path = self.backup_path(index + 1, compressed);
                if let Err(first) = fs::rename(&old_path, &new_path) {
                    // On some platforms rename fails when the destination exists
                    let _ = fs::remove_file(&new_path);
                    fs::rename(&old_path, &new_path).map_err(|e| {
                        LoggerError::file_rotation(
                            old_path.display().to_string(),
                            format!("Failed to rotate backup file: {} (first attempt: {})", e, first),
                        )
                    })?;
                }
            }
        }

        // Move current file to .1
        let backup_path = self.backup_path(1, false);
        if self.base_path.exists() {
            fs::rename(&self.base_path, &backup_path).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;

            if self.policy.compress {
                self.compress_file(&backup_path)?;
            }
        }

        let (file, _, _) = Self::open_file(&self.base_path).map_err(|e| {
            LoggerError::file_rotation(
                self.base_path.display().to_string(),
                format!("Failed to create new log file: {}", e),
            )
        })?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = 0;
        self.last_rotation = SystemTime::now();

        self.prune_backups();
        Ok(())
    }

    /// Remove backups beyond the count limit or older than the age limit.
    ///
    /// Returns how many files were removed. Failures are reported on stderr
    /// and retried on the next rotation.
    pub fn prune_backups(&mut self) -> usize {
        let now = SystemTime::now();
        let mut removed = 0;

        for index in self.backup_indices() {
            for compressed in [true, false] {
                let path = self.backup_path(index, compressed);
                let Ok(metadata) = fs::metadata(&path) else {
                    continue;
                };

                let over_count = self.policy.max_backups > 0 && index > self.policy.max_backups;
                let too_old = match (self.policy.max_age, metadata.modified()) {
                    (Some(max_age), Ok(modified)) => now
                        .duration_since(modified)
                        .map(|age| age > max_age)
                        .unwrap_or(false),
                    _ => false,
                };

                if over_count || too_old {
                    match fs::remove_file(&path) {
                        Ok(()) => removed += 1,
                        Err(e) => eprintln!(
                            "[WARN] Failed to remove old backup {}: {}",
                            path.display(),
                            e
                        ),
                    }
                }
            }
        }

        removed
    }

    /// Indices of existing backups, ascending
    pub fn backup_indices(&self) -> Vec<usize> {
        let Some(file_name) = self.base_path.file_name().and_then(|n| n.to_str()) else {
            return Vec::new();
        };
        let dir = match self.base_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };

        let prefix = format!("{}.", file_name);
        let mut indices: Vec<usize> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter_map(|name| {
                let rest = name.strip_prefix(&prefix)?;
                let digits = rest.strip_suffix(".gz").unwrap_or(rest);
                digits.parse::<usize>().ok().filter(|i| *i > 0)
            })
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// Get backup file path for given index
    pub fn backup_path(&self, index: usize, compressed: bool) -> PathBuf {
        let mut path = self.base_path.clone();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log")
            .to_string();
        if compressed {
            path.set_file_name(format!("{}.{}.gz", filename, index));
        } else {
            path.set_file_name(format!("{}.{}", filename, index));
        }
        path
    }

    /// Compress a log file with transactional safety using streaming I/O
    ///
    /// The original file is only deleted after compression fully succeeds.
    fn compress_file(&self, path: &Path) -> Result<()> {
        use std::io::BufReader;

        let mut gz_path = path.as_os_str().to_owned();
        gz_path.push(".gz");
        let gz_path = PathBuf::from(gz_path);
        let mut temp_gz_path = gz_path.as_os_str().to_owned();
        temp_gz_path.push(".tmp");
        let temp_gz_path = PathBuf::from(temp_gz_path);

        let input = File::open(path).map_err(|e| {
            LoggerError::io_operation(
                "compress log file",
                format!("Failed to open file for compression: {}", path.display()),
                e,
            )
        })?;
        let mut reader = BufReader::with_capacity(64 * 1024, input);

        let output = File::create(&temp_gz_path).map_err(|e| {
            LoggerError::io_operation(
                "compress log file",
                format!(
                    "Failed to create temporary compressed file: {}",
                    temp_gz_path.display()
                ),
                e,
            )
        })?;
        let buffered_output = BufWriter::with_capacity(64 * 1024, output);
        let mut encoder =
            flate2::write::GzEncoder::new(buffered_output, flate2::Compression::default());

        let streamed = io::copy(&mut reader, &mut encoder)
            .and_then(|_| encoder.finish())
            .and_then(|mut out| out.flush());
        if let Err(e) = streamed {
            let _ = fs::remove_file(&temp_gz_path);
            return Err(LoggerError::io_operation(
                "compress log file",
                format!("Failed to compress {}", path.display()),
                e,
            ));
        }

        fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
            let _ = fs::remove_file(&temp_gz_path);
            LoggerError::io_operation(
                "compress log file",
                format!("Failed to rename compressed file to: {}", gz_path.display()),
                e,
            )
        })?;

        if let Err(e) = fs::remove_file(path) {
            eprintln!(
                "[WARN] Compression succeeded but failed to remove original file {}: {}. \
                Both compressed and uncompressed versions exist.",
                path.display(),
                e
            );
        }

        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    /// Get current file size
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Get base path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    /// Get rotation policy
    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Get the timestamp of the last rotation
    #[must_use]
    pub fn last_rotation(&self) -> SystemTime {
        self.last_rotation
    }
}

impl Appender for RotatingFileAppender {
    fn name(&self) -> &str {
        "rotating_file"
    }

    fn append(&mut self, line: &[u8]) -> Result<()> {
        self.write_record(line)
    }

    fn flush(&mut self) -> Result<()> {
        RotatingFileAppender::flush(self)
    }
}

/// Line-oriented writer.
///
/// Bytes are held until a `\n` arrives, so a line produced by several
/// `write` calls (as `write!` does) is still one record and never split by
/// rotation. `flush` writes out an unterminated tail as its own record.
impl Write for RotatingFileAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.partial_line.extend_from_slice(buf);
        while let Some(end) = self.partial_line.iter().position(|&b| b == b'\n') {
            let record: Vec<u8> = self.partial_line.drain(..=end).collect();
            self.write_record(&record).map_err(io::Error::other)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.write_partial_line().map_err(io::Error::other)?;
        RotatingFileAppender::flush(self).map_err(io::Error::other)
    }
}

impl RotatingFileAppender {
    fn write_partial_line(&mut self) -> Result<()> {
        if self.partial_line.is_empty() {
            return Ok(());
        }
        let record = std::mem::take(&mut self.partial_line);
        self.write_record(&record)
    }
}

impl Drop for RotatingFileAppender {
    fn drop(&mut self) {
        if let Err(e) = self.write_partial_line() {
            eprintln!("[WARN] Dropped unterminated log line: {}", e);
        }
        if let Some(mut writer) = self.writer.take() {
            // Best effort flush - ignore errors during drop
            let _ = writer.flush();
        }
    }
}
