//! Integration tests for the logger
//!
//! These tests verify:
//! - Level gating and record layout
//! - Fan-out to several appenders
//! - Structured fields, including map conversion
//! - Write failures surfacing through sync
//! - Rotating file output built from configuration
//! - Log injection prevention

use rust_log_facade::appenders::{Appender, MemoryAppender, RotatingFileAppender, RotationPolicy};
use rust_log_facade::prelude::*;
use rust_log_facade::{fields, map2fields};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn memory_logger(level: LogLevel) -> (Logger, MemoryAppender) {
    let sink = MemoryAppender::new();
    let logger = Logger::builder()
        .min_level(level)
        .appender(sink.clone())
        .build();
    (logger, sink)
}

fn read_records(path: &std::path::Path) -> Vec<Value> {
    fs::read_to_string(path)
        .expect("Failed to read log file")
        .lines()
        .map(|line| serde_json::from_str(line).expect("line is not JSON"))
        .collect()
}

struct BrokenAppender;

impl Appender for BrokenAppender {
    fn append(&mut self, _line: &[u8]) -> rust_log_facade::Result<()> {
        Err(LoggerError::writer("disk unplugged"))
    }

    fn flush(&mut self) -> rust_log_facade::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "broken"
    }
}

#[test]
fn test_level_gate() {
    let (logger, sink) = memory_logger(LogLevel::Info);

    logger.debug("hidden", []);
    logger.info("shown", []);
    logger.warn("shown", []);
    logger.error("shown", []);

    let levels: Vec<Value> = sink.json_records().iter().map(|r| r["level"].clone()).collect();
    assert_eq!(levels, vec!["info", "warn", "error"]);
    assert_eq!(logger.metrics().filtered_count(), 1);
    assert_eq!(logger.metrics().total_logged(), 3);
}

#[test]
fn test_record_layout() {
    let (logger, sink) = memory_logger(LogLevel::Info);

    logger.info("user login", [Field::string("user", "alice"), Field::int("attempt", 2)]);

    let lines = sink.lines();
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert!(line.starts_with("{\"level\":\"info\",\"time\":\""));

    let record: Value = serde_json::from_str(line).unwrap();
    assert_eq!(record["msg"], "user login");
    assert_eq!(record["user"], "alice");
    assert_eq!(record["attempt"], 2);
    assert!(record.get("logger").is_none());
    assert!(record.get("stacktrace").is_none());

    let time = record["time"].as_str().unwrap();
    assert!(time.ends_with('Z'));
    assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());

    let linenum = record["linenum"].as_str().unwrap();
    assert!(
        linenum.starts_with("tests/integration_tests.rs:"),
        "unexpected caller {}",
        linenum
    );
}

#[test]
fn test_named_logger_and_context_fields() {
    let (logger, sink) = memory_logger(LogLevel::Info);

    let child = logger
        .named("api")
        .named("auth")
        .with([Field::string("request_id", "r-1")]);
    child.warn("token expired", [Field::bool("refresh", true)]);

    let record = &sink.json_records()[0];
    assert_eq!(record["logger"], "api.auth");
    assert_eq!(record["request_id"], "r-1");
    assert_eq!(record["refresh"], true);
    assert_eq!(logger.name(), "");
}

#[test]
fn test_stacktrace_threshold() {
    let sink = MemoryAppender::new();
    let logger = Logger::builder()
        .appender(sink.clone())
        .stacktrace_level(Some(LogLevel::Error))
        .build();

    logger.warn("no trace", []);
    logger.error("with trace", []);

    let records = sink.json_records();
    assert!(records[0].get("stacktrace").is_none());
    assert!(records[1]["stacktrace"].as_str().is_some_and(|s| !s.is_empty()));
}

#[test]
fn test_runtime_level_change_is_shared() {
    let (logger, sink) = memory_logger(LogLevel::Warn);
    let clone = logger.clone();

    clone.info("dropped", []);
    logger.set_level(LogLevel::Debug);
    clone.debug("kept", []);

    assert_eq!(sink.json_records().len(), 1);
    assert_eq!(clone.level(), LogLevel::Debug);
}

#[test]
fn test_fan_out_to_every_appender() {
    let first = MemoryAppender::new();
    let second = MemoryAppender::new();
    let logger = Logger::builder()
        .appender(first.clone())
        .appender(second.clone())
        .build();

    logger.info("broadcast", []);

    assert_eq!(first.lines(), second.lines());
    assert_eq!(first.lines().len(), 1);
}

#[test]
fn test_failed_sink_does_not_block_others() {
    let healthy = MemoryAppender::new();
    let logger = Logger::builder()
        .appender(BrokenAppender)
        .appender(healthy.clone())
        .build();

    logger.error("still delivered", []);
    assert_eq!(healthy.json_records().len(), 1);
    assert_eq!(logger.metrics().write_failures(), 1);

    let err = logger.sync().expect_err("sync should report the failed write");
    assert!(err.to_string().contains("disk unplugged"));

    // The failure is reported once
    assert!(logger.sync().is_ok());
}

#[test]
fn test_map2fields_through_logger() {
    let (logger, sink) = memory_logger(LogLevel::Info);

    let mut map: HashMap<String, FieldValue> = HashMap::new();
    map.insert("order_id".to_string(), "A-17".into());
    map.insert("amount".to_string(), 12.5.into());
    map.insert("paid".to_string(), true.into());
    map.insert("elapsed".to_string(), Duration::from_millis(1500).into());

    logger.info("order placed", map2fields(map));

    let record = &sink.json_records()[0];
    assert_eq!(record["order_id"], "A-17");
    assert_eq!(record["amount"], 12.5);
    assert_eq!(record["paid"], true);
    assert_eq!(record["elapsed"], 1.5);
}

#[test]
fn test_nested_and_special_values() {
    let (logger, sink) = memory_logger(LogLevel::Info);

    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "config missing");
    logger.error(
        "startup failed",
        [
            Field::error(&io_error),
            Field::object("peer", fields! { "host" => "db", "port" => 5432 }),
            Field::array("retries", vec![1, 2, 3]),
            Field::float("ratio", f64::NAN),
            Field::null("owner"),
        ],
    );

    let record = &sink.json_records()[0];
    assert_eq!(record["error"], "config missing");
    assert_eq!(record["peer"]["host"], "db");
    assert_eq!(record["peer"]["port"], 5432);
    assert_eq!(record["retries"], serde_json::json!([1, 2, 3]));
    assert_eq!(record["ratio"], "NaN");
    assert!(record["owner"].is_null());
}

#[test]
fn test_log_injection_prevention() {
    let (logger, sink) = memory_logger(LogLevel::Info);

    let malicious_message = "User login\n{\"level\":\"error\",\"msg\":\"fake\"}\nContinuation";
    logger.info(malicious_message, [Field::string("note", "a\nb")]);

    let lines = sink.lines();
    assert_eq!(lines.len(), 1, "Log should be a single line, not multiple");
    assert!(lines[0].contains("\\n"));

    let record: Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(record["msg"], malicious_message);
}

#[test]
fn test_rotating_file_appender_in_logger() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("logs").join("1.log");

    let policy = RotationPolicy::new()
        .with_max_size(512)
        .with_max_backups(3)
        .with_compression(false);
    let appender = RotatingFileAppender::with_policy(&log_file, policy).unwrap();
    let first_backup = appender.backup_path(1, false);
    let logger = Logger::builder().appender(appender).build();

    for i in 0..20 {
        logger.info(format!("message {}", i), [Field::int("seq", i)]);
    }
    logger.sync().expect("Failed to sync");

    assert!(first_backup.exists(), "expected at least one rotation");
    let current = read_records(&log_file);
    assert!(!current.is_empty());
    assert_eq!(current.last().unwrap()["seq"], 19);
    assert!(fs::metadata(&log_file).unwrap().len() <= 512);
}

#[test]
fn test_logger_from_json_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");

    let json = serde_json::json!({
        "console": false,
        "level": "warn",
        "development": false,
        "file": { "path": log_file, "max_size_mb": 1, "max_backups": 2 },
        "encoder": { "level_encoding": "uppercase", "message_key": "message" }
    });
    let config = FacadeConfig::from_json_str(&json.to_string()).unwrap();
    let logger = config.build_logger().unwrap();

    logger.info("dropped", []);
    logger.warn("kept", []);
    logger.sync().unwrap();

    let records = read_records(&log_file);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["level"], "WARN");
    assert_eq!(records[0]["message"], "kept");
}

#[test]
fn test_dpanic_panics_in_development() {
    let sink = MemoryAppender::new();
    let logger = Logger::builder()
        .appender(sink.clone())
        .development(true)
        .build();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        logger.dpanic("broken invariant", []);
    }));
    assert!(result.is_err());
    assert_eq!(sink.json_records()[0]["level"], "dpanic");
}

#[test]
fn test_panic_logs_then_panics_even_when_filtered() {
    let (logger, sink) = memory_logger(LogLevel::Fatal);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        logger.panic("unrecoverable", []);
    }));

    let payload = result.expect_err("panic must unwind");
    assert_eq!(payload.downcast_ref::<String>().map(String::as_str), Some("unrecoverable"));
    assert!(sink.lines().is_empty());
}
