//! Process-level behavior of the global facade
//!
//! `fatal` ends the process, so each scenario re-runs this test binary with an
//! environment variable naming the scenario and inspects the child.

use rust_log_facade::{self as log, FacadeConfig, Field, FileSinkConfig};
use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const SCENARIO_VAR: &str = "LOG_FACADE_SCENARIO";
const LOG_PATH_VAR: &str = "LOG_FACADE_PATH";

fn run_child(test_name: &str, log_path: &Path) -> Output {
    Command::new(std::env::current_exe().expect("current test binary"))
        .args(["--exact", test_name, "--nocapture", "--test-threads=1"])
        .env(SCENARIO_VAR, test_name)
        .env(LOG_PATH_VAR, log_path)
        .output()
        .expect("failed to spawn child test process")
}

fn in_child(test_name: &str) -> Option<std::path::PathBuf> {
    match std::env::var(SCENARIO_VAR) {
        Ok(scenario) if scenario == test_name => {
            std::env::var_os(LOG_PATH_VAR).map(Into::into)
        }
        _ => None,
    }
}

fn init_facade(path: std::path::PathBuf, level: log::LogLevel) {
    log::init(FacadeConfig {
        file: Some(FileSinkConfig {
            path,
            ..FileSinkConfig::default()
        }),
        level,
        ..FacadeConfig::default()
    })
    .expect("facade init");
}

fn json_lines(text: &str) -> Vec<Value> {
    text.lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

#[test]
fn fatal_flushes_and_exits_with_status_one() {
    if let Some(path) = in_child("fatal_flushes_and_exits_with_status_one") {
        init_facade(path, log::LogLevel::Info);
        log::info("before fatal", []);
        log::fatal("cannot continue", [Field::string("reason", "disk full")]);
    }

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("logs").join("1.log");
    let output = run_child("fatal_flushes_and_exits_with_status_one", &log_path);

    assert_eq!(output.status.code(), Some(1));

    let file_records = json_lines(&std::fs::read_to_string(&log_path).unwrap());
    assert_eq!(file_records.len(), 2);
    assert_eq!(file_records[1]["level"], "fatal");
    assert_eq!(file_records[1]["msg"], "cannot continue");
    assert_eq!(file_records[1]["reason"], "disk full");
    assert!(file_records[1]["stacktrace"].is_string());

    let stdout_records = json_lines(&String::from_utf8_lossy(&output.stdout));
    assert!(stdout_records
        .iter()
        .any(|r| r["level"] == "fatal" && r["msg"] == "cannot continue"));
}

#[test]
fn fatal_passes_a_fatal_only_gate() {
    if let Some(path) = in_child("fatal_passes_a_fatal_only_gate") {
        init_facade(path, log::LogLevel::Fatal);
        log::error("filtered", []);
        log::fatal("still exits", []);
    }

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("1.log");
    let output = run_child("fatal_passes_a_fatal_only_gate", &log_path);

    assert_eq!(output.status.code(), Some(1));
    let file_records = json_lines(&std::fs::read_to_string(&log_path).unwrap());
    assert_eq!(file_records.len(), 1);
    assert_eq!(file_records[0]["msg"], "still exits");
}

#[test]
fn default_facade_writes_to_logs_dir() {
    if let Some(path) = in_child("default_facade_writes_to_logs_dir") {
        // Relative default path resolves against the working directory
        std::env::set_current_dir(&path).expect("chdir");
        log::info("hello", [Field::int("n", 1)]);
        log::debug("below the default level", []);
        log::sync().expect("sync");
        std::process::exit(0);
    }

    let dir = TempDir::new().unwrap();
    let output = run_child("default_facade_writes_to_logs_dir", dir.path());

    assert_eq!(output.status.code(), Some(0));
    let records = json_lines(&std::fs::read_to_string(dir.path().join("logs").join("1.log")).unwrap());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["level"], "info");
    assert_eq!(records[0]["n"], 1);
    assert!(records[0]["linenum"]
        .as_str()
        .is_some_and(|c| c.starts_with("tests/fatal_tests.rs:")));
}

#[test]
fn panic_record_reaches_file_without_sync() {
    if let Some(path) = in_child("panic_record_reaches_file_without_sync") {
        init_facade(path, log::LogLevel::Info);
        log::info("before", []);
        log::panic("boom", [Field::int("code", 7)]);
    }

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("1.log");
    let output = run_child("panic_record_reaches_file_without_sync", &log_path);

    // A failed test exits with 101
    assert_eq!(output.status.code(), Some(101));
    let records = json_lines(&std::fs::read_to_string(&log_path).unwrap());
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["msg"], "before");
    assert_eq!(records[1]["level"], "panic");
    assert_eq!(records[1]["msg"], "boom");
    assert_eq!(records[1]["code"], 7);
}

#[test]
fn dpanic_record_reaches_file_under_default_development_mode() {
    if let Some(path) = in_child("dpanic_record_reaches_file_under_default_development_mode") {
        init_facade(path, log::LogLevel::Info);
        log::warn("before", []);
        log::dpanic("odd state", []);
        // Development mode panics above, so this exit is never reached
        std::process::exit(3);
    }

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("1.log");
    let output = run_child(
        "dpanic_record_reaches_file_under_default_development_mode",
        &log_path,
    );

    assert_eq!(output.status.code(), Some(101));
    let records = json_lines(&std::fs::read_to_string(&log_path).unwrap());
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["level"], "warn");
    assert_eq!(records[1]["level"], "dpanic");
    assert_eq!(records[1]["msg"], "odd state");
}
