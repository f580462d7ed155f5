//! Logger module
//!
//! Provides logging utilities for the agent including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Command, error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::agent::Command;
use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info(&format!("{} v{}", config.agent.name, config.agent.version));
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("  - GET  http://{addr}/"));
    write_info(&format!("  - GET  http://{addr}/health"));
    write_info(&format!("  - GET  http://{addr}/.well-known/agent.json"));
    write_info(&format!("  - POST http://{addr}/"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_config(message: &str) {
    write_info(&format!("[CONFIG] {message}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log a parsed chat command. Payloads are summarized by length only.
pub fn log_command(command: &Command<'_>) {
    let line = match command {
        Command::Qr(payload) => format!("[Command] qr ({} bytes)", payload.len()),
        Command::Barcode(payload) => format!("[Command] barcode ({} bytes)", payload.len()),
        Command::Unknown => "[Command] help".to_string(),
    };
    write_info(&line);
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}

pub fn log_shutdown(reason: &str) {
    write_info(&format!("\n[Shutdown] {reason}, no longer accepting connections"));
}
