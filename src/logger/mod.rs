//! Relay logging
//!
//! Lifecycle lines and access lines go to the access sink, warnings, errors
//! and upstream failures to the error sink. Before [`init`] runs everything
//! falls back to stdout/stderr.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use std::net::SocketAddr;

use crate::config::Config;

/// Open the configured log sinks; call once at startup
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        &config.logging.level,
    )
}

fn write_info(message: &str) {
    writer::get().map_or_else(|| println!("{message}"), |w| w.write_info(message));
}

fn write_error(message: &str) {
    writer::get().map_or_else(|| eprintln!("{message}"), |w| w.write_error(message));
}

fn write_access(message: &str) {
    writer::get().map_or_else(|| println!("{message}"), |w| w.write_access(message));
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Model relay started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    write_info(&format!("Models upstream: {}", config.upstream.models_url));
    match &config.upstream.proxy_target {
        Some(target) => write_info(&format!(
            "Proxy: {}/* -> {target}",
            config.upstream.proxy_prefix
        )),
        None => write_info("Proxy: no default target"),
    }
    if config.upstream.allow_target_override {
        write_info("Proxy target override via ?target= is ENABLED");
    }
    if config.is_development_mode() {
        write_info("Access: development mode (no API key configured, all origins allowed)");
    } else {
        write_info(&format!(
            "Access: {} allowed origin(s), API key required for server-to-server calls",
            config.access.allowed_origins.len()
        ));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_shutdown() {
    write_info("[Shutdown] Listener closed, in-flight requests finish in the background");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_info(message: &str) {
    write_info(message);
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_debug(message: &str) {
    if writer::get().is_some_and(writer::LogWriter::debug_enabled) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

/// Log an upstream fetch that did not produce a usable response
pub fn log_upstream_failure(url: &str, detail: &str) {
    write_error(&format!("[UPSTREAM] {url} failed: {detail}"));
}
