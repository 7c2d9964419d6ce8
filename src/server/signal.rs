// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::Arc;

use tokio::sync::Notify;

/// Start the signal listener
///
/// Spawns a background task that notifies `shutdown` once on the first
/// SIGINT or SIGTERM.
pub fn start_signal_handler(shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Initiating graceful shutdown");
        shutdown.notify_one();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to register SIGTERM handler, Ctrl+C only");
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("SIGTERM received"),
        () = ctrl_c() => tracing::info!("SIGINT received"),
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await;
    tracing::info!("Ctrl+C received");
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
