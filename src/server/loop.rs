// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::GatewayState;
use crate::logger;

/// Pause after a failed `accept` (e.g. out of file descriptors)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Serve connections from `listener` until `shutdown` is notified
///
/// After the signal the listener is closed and open connections get
/// `server.shutdown_grace_period` seconds to finish their current request.
pub async fn serve(listener: TcpListener, state: Arc<GatewayState>, shutdown: Arc<Notify>) {
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &graceful);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }

            () = shutdown.notified() => break,
        }
    }

    drop(listener);

    let grace_secs = state.config.server.shutdown_grace_period;
    logger::log_shutdown_started(state.active_connections.load(Ordering::SeqCst), grace_secs);

    let drained = tokio::time::timeout(Duration::from_secs(grace_secs), graceful.shutdown())
        .await
        .is_ok();
    logger::log_shutdown_complete(drained);
}
