// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(rename = "static")]
    pub static_files: StaticConfig,
    pub proxy: ProxyConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Seconds in-flight connections get to finish after a termination signal
    pub shutdown_grace_period: u64,
}

/// Static file configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StaticConfig {
    /// Directory served as the static root
    pub root: PathBuf,
    /// Document served for `/` and for directories
    pub default_document: String,
    /// Serve path segments starting with `.`
    pub serve_dotfiles: bool,
    /// `max-age` of the `Cache-Control` header on static responses
    pub max_age: u32,
}

/// Reverse proxy configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProxyConfig {
    /// Upstream origin, e.g. `http://localhost:3001`
    pub upstream: String,
    /// Overwrite `Host` with the upstream authority
    pub change_origin: bool,
    /// Add `X-Forwarded-*` headers
    pub xfwd: bool,
    /// Seconds to wait for the upstream response head (no limit when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Rewrite `Location` headers pointing at the upstream to the gateway host
    pub rewrite_location: bool,
    /// Replace the `Domain` attribute of `Set-Cookie` headers (empty removes it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_domain: Option<String>,
    /// Frames buffered between upstream and client while relaying a body
    pub relay_buffer: usize,
    /// Ordered prefix rewrite table, first match wins
    #[serde(default = "default_rewrite_rules")]
    pub rewrite: Vec<RewriteRule>,
}

/// Prefix rewrite rule applied to the path before forwarding
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pub prefix: String,
    #[serde(default)]
    pub replacement: String,
}

impl RewriteRule {
    pub fn new(prefix: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            replacement: replacement.into(),
        }
    }
}

pub fn default_rewrite_rules() -> Vec<RewriteRule> {
    vec![RewriteRule::new("/api", "")]
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub header_read_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u64>,
}
