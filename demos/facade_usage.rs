//! Facade usage example
//!
//! Demonstrates the process-wide logger: leveled calls, structured fields,
//! map conversion, named child loggers and flushing before exit.
//!
//! Run with: cargo run --example facade_usage

use rust_log_facade::{self as log, fields, FacadeConfig, Field, FieldValue, LogLevel};
use std::collections::HashMap;
use std::time::{Duration, Instant};

fn main() -> log::Result<()> {
    println!("=== Rust Log Facade - Usage Example ===\n");

    // Same setup as the lazily built default, but with debug records enabled
    log::init(FacadeConfig {
        level: LogLevel::Debug,
        ..FacadeConfig::default()
    })?;

    println!("1. Leveled logging:");
    log::debug("cache lookup", [Field::string("key", "user:42")]);
    log::info("service started", [Field::int("port", 8080)]);
    log::warn("slow response", [Field::duration("elapsed", Duration::from_millis(850))]);

    println!("\n2. Fields from a map:");
    let mut request: HashMap<&str, FieldValue> = HashMap::new();
    request.insert("method", "POST".into());
    request.insert("path", "/orders".into());
    request.insert("status", 201.into());
    log::info("request served", log::map2fields(request));

    println!("\n3. Named child logger with context:");
    let worker = log::global()
        .named("worker")
        .with(fields! { "queue" => "emails", "worker_id" => 3 });
    let started = Instant::now();
    worker.info("job finished", [Field::duration("took", started.elapsed())]);

    println!("\n4. Errors carry a stacktrace:");
    let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "cannot write spool");
    log::error("job failed", [Field::error(&err)]);

    println!("\n5. Records are written to ./logs/1.log as well");
    log::sync()?;

    println!("\n=== Example completed ===");
    Ok(())
}
