//! Response body module
//!
//! Every response leaving the gateway uses [`GatewayBody`]: static files and
//! error pages are a single in-memory chunk, proxied bodies are relayed frame
//! by frame through a bounded channel.

use std::pin::Pin;
use std::task::{Context, Poll};

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Body, Bytes, Frame, Incoming};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Boxed body type shared by static and proxied responses
pub type GatewayBody = BoxBody<Bytes, hyper::Error>;

/// Body holding one complete chunk
pub fn full(data: impl Into<Bytes>) -> GatewayBody {
    Full::new(data.into()).map_err(|never| match never {}).boxed()
}

/// Body with no content (HEAD responses, 304, 204)
pub fn empty() -> GatewayBody {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed()
}

/// Aborts the upstream connection task when dropped
///
/// Travels with the request until the response head arrives and then with
/// the relay task, so the upstream socket closes as soon as nobody is left to
/// read from it.
#[derive(Debug)]
pub struct ConnectionGuard(JoinHandle<()>);

impl ConnectionGuard {
    pub const fn new(task: JoinHandle<()>) -> Self {
        Self(task)
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Consumer half of the relay pipe
#[derive(Debug)]
pub struct RelayBody {
    rx: mpsc::Receiver<Result<Frame<Bytes>, hyper::Error>>,
}

impl Body for RelayBody {
    type Data = Bytes;
    type Error = hyper::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

/// Relay an upstream body to the client through a channel of `capacity` frames
///
/// The producer task waits whenever the channel is full, so a slow client
/// slows the upstream read instead of growing memory. When the client goes
/// away the receiver is dropped, the producer stops and `guard` closes the
/// upstream connection.
pub fn relay(upstream: Incoming, capacity: usize, guard: ConnectionGuard) -> RelayBody {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    tokio::spawn(async move {
        let _guard = guard;
        let mut upstream = upstream;

        loop {
            let frame = tokio::select! {
                frame = upstream.frame() => frame,
                () = tx.closed() => {
                    tracing::debug!("Client went away, closing upstream connection");
                    return;
                }
            };

            let Some(frame) = frame else {
                return;
            };

            let failed = frame.is_err();
            if let Err(e) = &frame {
                tracing::warn!(error = %e, "Upstream body error while relaying");
            }
            if tx.send(frame).await.is_err() {
                tracing::debug!("Client went away, closing upstream connection");
                return;
            }
            if failed {
                return;
            }
        }
    });

    RelayBody { rx }
}
