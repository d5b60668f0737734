//! Facade configuration
//!
//! [`FacadeConfig::default`] is the process-wide setup: JSON lines on stdout
//! and in `./logs/1.log`, rotated at 128 MiB, 30 backups kept for at most 7
//! days and gzipped, minimum level `info`, development mode on. Every part can
//! be overridden in code or loaded from JSON.

use crate::appenders::{ConsoleAppender, RotatingFileAppender, RotationPolicy};
use crate::core::{EncoderConfig, LogLevel, Logger, LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LOG_PATH: &str = "./logs/1.log";
pub const DEFAULT_MAX_SIZE_MB: u64 = 128;
pub const DEFAULT_MAX_BACKUPS: usize = 30;
pub const DEFAULT_MAX_AGE_DAYS: u64 = 7;

/// Rotating file output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSinkConfig {
    pub path: PathBuf,
    /// Size in MiB at which the file is rotated
    pub max_size_mb: u64,
    /// Rotated files to keep; 0 keeps all
    pub max_backups: usize,
    /// Days a rotated file is kept; 0 keeps them regardless of age
    pub max_age_days: u64,
    /// Gzip rotated files
    pub compress: bool,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_PATH),
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            max_backups: DEFAULT_MAX_BACKUPS,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            compress: true,
        }
    }
}

impl FileSinkConfig {
    pub fn rotation_policy(&self) -> RotationPolicy {
        let policy = RotationPolicy::new()
            .with_max_size_mb(self.max_size_mb)
            .with_max_backups(self.max_backups)
            .with_compression(self.compress);
        if self.max_age_days == 0 {
            policy
        } else {
            policy.with_max_age_days(self.max_age_days)
        }
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.rotation_policy().max_age
    }
}

/// Everything needed to build the process-wide logger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacadeConfig {
    /// Rotating file output; `None` disables it
    pub file: Option<FileSinkConfig>,
    /// Also write to standard output
    pub console: bool,
    /// Minimum level written
    pub level: LogLevel,
    /// When on, `dpanic` panics after logging
    pub development: bool,
    /// Records at or above this level carry a stacktrace
    pub stacktrace_level: Option<LogLevel>,
    pub encoder: EncoderConfig,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            file: Some(FileSinkConfig::default()),
            console: true,
            level: LogLevel::Info,
            development: true,
            stacktrace_level: Some(LogLevel::Error),
            encoder: EncoderConfig::default(),
        }
    }
}

impl FacadeConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FacadeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logger configuration",
                path.display().to_string(),
                e,
            )
        })?;
        Self::from_json_str(&json)
    }

    /// Same configuration without the file output
    #[must_use]
    pub fn console_only(mut self) -> Self {
        self.file = None;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(file) = &self.file {
            if file.path.as_os_str().is_empty() {
                return Err(LoggerError::config("FileSinkConfig", "path must not be empty"));
            }
            if file.max_size_mb == 0 {
                return Err(LoggerError::config(
                    "FileSinkConfig",
                    "max_size_mb must be greater than zero",
                ));
            }
        }
        if self.encoder.message_key.is_empty() {
            return Err(LoggerError::config(
                "EncoderConfig",
                "message key must not be empty",
            ));
        }
        Ok(())
    }

    /// Build a logger writing to the configured outputs.
    ///
    /// Console comes first, then the rotating file.
    pub fn build_logger(&self) -> Result<Logger> {
        self.validate()?;

        let mut builder = Logger::builder()
            .min_level(self.level)
            .encoder(self.encoder.clone())
            .development(self.development)
            .stacktrace_level(self.stacktrace_level);

        if self.console {
            builder = builder.appender(ConsoleAppender::stdout());
        }
        if let Some(file) = &self.file {
            let appender = RotatingFileAppender::with_policy(&file.path, file.rotation_policy())?;
            builder = builder.appender(appender);
        }

        Ok(builder.build())
    }
}
