// Gateway state module
// Immutable per-process state shared by every connection

use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;

use super::types::Config;
use super::upstream::Upstream;
use crate::error::GatewayError;

/// Shared gateway state
///
/// Built once at startup and handed to each connection behind an `Arc`.
/// Only the connection counter changes after construction.
pub struct GatewayState {
    pub config: Config,
    pub upstream: Upstream,
    /// Canonical static root, resolved once so symlink checks are cheap
    pub static_root: Option<PathBuf>,
    pub active_connections: AtomicUsize,
}

impl GatewayState {
    pub fn new(config: Config) -> Result<Self, GatewayError> {
        config.validate()?;
        let upstream = Upstream::parse(&config.proxy.upstream)?;

        // A missing root is not fatal: every request then falls through to the proxy
        let static_root = match config.static_files.root.canonicalize() {
            Ok(root) if root.is_dir() => Some(root),
            Ok(root) => {
                tracing::warn!(
                    root = %root.display(),
                    "Static root is not a directory; static serving disabled"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    root = %config.static_files.root.display(),
                    error = %e,
                    "Static root not accessible; static serving disabled"
                );
                None
            }
        };

        Ok(Self {
            config,
            upstream,
            static_root,
            active_connections: AtomicUsize::new(0),
        })
    }
}
