//! Reverse proxy module
//!
//! Second pipeline stage. Rewrites the path, forwards the request over a
//! fresh HTTP/1.1 connection and relays the upstream response back.

use std::net::SocketAddr;
use std::time::Duration;

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper::header::{self, HeaderValue};
use hyper::{Request, Response, Uri, Version};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::config::{GatewayState, Upstream};
use crate::error::GatewayError;
use crate::http::body::{relay, ConnectionGuard};
use crate::http::headers;
use crate::http::GatewayBody;
use crate::routing::rewrite_path_and_query;

/// Forward a request to the upstream and relay its response
///
/// Connection failures map to 502 and an elapsed `proxy.timeout` to 504.
/// Dropping the returned body (client gone) tears down the upstream
/// connection.
pub async fn forward(
    req: Request<Incoming>,
    state: &GatewayState,
    peer: SocketAddr,
) -> Result<Response<GatewayBody>, GatewayError> {
    let proxy = &state.config.proxy;
    let upstream = &state.upstream;

    let (mut parts, body) = req.into_parts();
    let original_host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);

    let path_and_query =
        rewrite_path_and_query(parts.uri.path(), parts.uri.query(), &proxy.rewrite);
    let target = upstream.target(&path_and_query);
    tracing::debug!(
        from = %parts.uri,
        to = %target,
        upstream = %upstream.authority(),
        "Forwarding request"
    );

    parts.uri = target.parse::<Uri>().map_err(hyper::http::Error::from)?;
    parts.version = Version::HTTP_11;

    headers::strip_hop_by_hop(&mut parts.headers);
    if proxy.change_origin || original_host.is_none() {
        let host = HeaderValue::from_str(upstream.authority().as_str())
            .map_err(hyper::http::Error::from)?;
        parts.headers.insert(header::HOST, host);
    }
    if proxy.xfwd {
        headers::set_forwarded(&mut parts.headers, peer.ip(), original_host.as_deref());
    }

    let exchange = send(upstream, Request::from_parts(parts, body));
    let (response, guard) = match proxy.timeout {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), exchange)
            .await
            .map_err(|_| GatewayError::Timeout)??,
        None => exchange.await?,
    };

    let (mut parts, body) = response.into_parts();
    headers::strip_hop_by_hop(&mut parts.headers);
    if proxy.rewrite_location {
        if let Some(host) = original_host.as_deref() {
            headers::rewrite_location(&mut parts.headers, &upstream.origin(), host);
        }
    }
    if let Some(domain) = proxy.cookie_domain.as_deref() {
        headers::rewrite_cookie_domain(&mut parts.headers, domain);
    }

    let body = relay(body, proxy.relay_buffer, guard).boxed();
    Ok(Response::from_parts(parts, body))
}

/// Open a connection, send the request and wait for the response head
///
/// The connection task lives as long as the returned guard.
async fn send(
    upstream: &Upstream,
    request: Request<Incoming>,
) -> Result<(Response<Incoming>, ConnectionGuard), GatewayError> {
    let addr = upstream.connect_addr();
    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|e| GatewayError::ConnectionFailed(format!("{addr}: {e}")))?;
    let _ = stream.set_nodelay(true);

    let (mut sender, conn) = http1::handshake::<_, Incoming>(TokioIo::new(stream)).await?;
    let guard = ConnectionGuard::new(tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!(error = %e, "Upstream connection closed with error");
        }
    }));

    let response = sender.send_request(request).await?;
    Ok((response, guard))
}
