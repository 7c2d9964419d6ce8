//! Request dispatch module
//!
//! Entry point for HTTP request processing. Runs the two-stage pipeline:
//! the static resolver first (GET/HEAD only), then the proxy forwarder for
//! anything it passes on.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use hyper::body::Incoming;
use hyper::header::{self, HeaderMap};
use hyper::{Method, Request, Response, Version};

use crate::config::GatewayState;
use crate::error::GatewayError;
use crate::handler::proxy;
use crate::handler::static_files::{self, Resolution};
use crate::http::{self, GatewayBody};
use crate::logger::{self, AccessLogEntry};
use crate::routing::RequestPath;

/// Request context encapsulating what the static stage needs
pub struct RequestContext<'a> {
    pub raw_path: &'a str,
    pub path: &'a RequestPath,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub range_header: Option<&'a str>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<GatewayState>,
    peer: SocketAddr,
) -> Result<Response<GatewayBody>, Infallible> {
    let started = Instant::now();
    let mut entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, peer));

    let (response, stage) = match dispatch(req, &state, peer).await {
        Ok(answered) => answered,
        Err(e) => {
            log_failure(&e);
            (http::build_error_response(&e), "error")
        }
    };

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = content_length(response.headers());
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        entry.stage = stage;
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Run the pipeline, reporting which stage produced the response
async fn dispatch(
    req: Request<Incoming>,
    state: &GatewayState,
    peer: SocketAddr,
) -> Result<(Response<GatewayBody>, &'static str), GatewayError> {
    let path = RequestPath::parse(req.uri().path())?;

    if matches!(*req.method(), Method::GET | Method::HEAD) {
        let ctx = RequestContext {
            raw_path: req.uri().path(),
            path: &path,
            is_head: req.method() == Method::HEAD,
            if_none_match: header_str(req.headers(), &header::IF_NONE_MATCH),
            range_header: header_str(req.headers(), &header::RANGE),
        };

        if let Resolution::Served(response) = static_files::resolve(&ctx, state).await? {
            return Ok((response, "static"));
        }
    }

    let response = proxy::forward(req, state, peer).await?;
    Ok((response, "proxy"))
}

fn log_failure(err: &GatewayError) {
    match err {
        GatewayError::MalformedPath(_) => {
            tracing::debug!(error = %err, kind = err.error_type(), "Rejected request");
        }
        GatewayError::ConnectionFailed(_) | GatewayError::Upstream(_) | GatewayError::Timeout => {
            tracing::warn!(error = %err, kind = err.error_type(), "Proxy request failed");
        }
        _ => {
            tracing::error!(error = %err, kind = err.error_type(), "Request failed");
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    header_str(headers, &header::CONTENT_LENGTH).and_then(|v| v.parse().ok())
}

fn access_entry(req: &Request<Incoming>, peer: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_str(req.headers(), &header::REFERER).map(ToString::to_string);
    entry.user_agent = header_str(req.headers(), &header::USER_AGENT).map(ToString::to_string);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
