// Connection handling module
// Accepts a single TCP connection and serves it on its own task

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpStream;

use crate::config::GatewayState;
use crate::handler;
use crate::logger;

/// Holds one slot of the active connection counter until dropped
struct ConnectionSlot(Arc<GatewayState>);

impl ConnectionSlot {
    /// Claim a slot, or `None` when `max_connections` is reached
    fn claim(state: &Arc<GatewayState>) -> Option<Self> {
        // Increment first, then check the limit so concurrent accepts cannot both slip in
        let prev = state.active_connections.fetch_add(1, Ordering::SeqCst);
        let slot = Self(Arc::clone(state));

        if let Some(max) = state.config.performance.max_connections {
            if prev >= usize::try_from(max).unwrap_or(usize::MAX) {
                tracing::warn!("Max connections reached: {prev}/{max}. Connection rejected.");
                return None;
            }
        }
        Some(slot)
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.active_connections.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Accept a connection, enforcing the connection limit
///
/// Rejected connections are closed immediately without a response.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<GatewayState>,
    graceful: &GracefulShutdown,
) {
    let Some(slot) = ConnectionSlot::claim(state) else {
        drop(stream);
        return;
    };

    tracing::trace!(peer = %peer_addr, "Accepted connection");
    let _ = stream.set_nodelay(true);
    handle_connection(stream, peer_addr, Arc::clone(state), graceful, slot);
}

/// Serve one connection in a spawned task
///
/// HTTP/1.1 with optional keep-alive. Only the wait for request headers is
/// bounded; long-lived proxied streams are not cut off.
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<GatewayState>,
    graceful: &GracefulShutdown,
    slot: ConnectionSlot,
) {
    let perf = &state.config.performance;

    let mut builder = http1::Builder::new();
    builder.keep_alive(perf.keep_alive);
    if perf.header_read_timeout > 0 {
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(perf.header_read_timeout));
    }

    let service_state = Arc::clone(&state);
    let conn = builder.serve_connection(
        TokioIo::new(stream),
        service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
    );
    let conn = graceful.watch(conn);

    tokio::spawn(async move {
        if let Err(err) = conn.await {
            logger::log_connection_error(&peer_addr, &err);
        }
        drop(slot);
    });
}
