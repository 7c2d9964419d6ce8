//! Logger module
//!
//! Provides logging utilities for the gateway including:
//! - Subscriber initialisation
//! - Server lifecycle logging
//! - Access logging with multiple formats

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use crate::config::{Config, LoggingConfig};

/// Target used for access log lines, filterable via `RUST_LOG=access=off`
pub const ACCESS_TARGET: &str = "access";

/// Initialize the tracing subscriber
///
/// `RUST_LOG` wins over `logging.level`. Should be called once at startup;
/// later calls are ignored.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Listening on: http://{addr}");
    tracing::info!(
        root = %config.static_files.root.display(),
        default_document = %config.static_files.default_document,
        "Static root"
    );
    tracing::info!(
        upstream = %config.proxy.upstream,
        rules = config.proxy.rewrite.len(),
        change_origin = config.proxy.change_origin,
        "Proxy upstream"
    );
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(max) = config.performance.max_connections {
        tracing::info!("Connection limit: {max}");
    }
}

pub fn log_shutdown_started(active: usize, grace_secs: u64) {
    tracing::info!(
        active_connections = active,
        "Shutdown signal received, draining for up to {grace_secs}s"
    );
}

pub fn log_shutdown_complete(drained: bool) {
    if drained {
        tracing::info!("All connections closed, exiting");
    } else {
        tracing::warn!("Grace period elapsed with connections still open, exiting");
    }
}

pub fn log_connection_error(peer: &SocketAddr, err: &impl std::fmt::Display) {
    tracing::debug!(%peer, error = %err, "Connection closed with error");
}

/// Emit a formatted access log line
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}
