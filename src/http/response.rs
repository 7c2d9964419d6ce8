//! HTTP response building module
//!
//! Builders for the responses the gateway produces itself; proxied responses
//! are relayed, not built here.

use hyper::header;
use hyper::{Response, StatusCode};

use super::body::{self, GatewayBody};
use super::cache::CachePolicy;
use super::range::ByteRange;
use crate::error::GatewayError;

/// Metadata shared by full and partial static responses
pub struct FileMeta<'a> {
    pub content_type: &'a str,
    pub etag: &'a str,
    pub cache: CachePolicy,
}

/// Build error response for a request-terminal failure
pub fn build_error_response(err: &GatewayError) -> Response<GatewayBody> {
    Response::builder()
        .status(err.status_code())
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(header::CACHE_CONTROL, CachePolicy::NoCache.to_header_value())
        .body(body::full(err.public_message()))
        .unwrap_or_else(|e| {
            log_build_error(err.status_code().as_str(), &e);
            fallback(err.status_code())
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, cache: CachePolicy) -> Response<GatewayBody> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(header::ETAG, etag)
        .header(header::CACHE_CONTROL, cache.to_header_value())
        .body(body::empty())
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            fallback(StatusCode::NOT_MODIFIED)
        })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<GatewayBody> {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(header::CONTENT_RANGE, format!("bytes */{file_size}"))
        .body(body::full("416 Range Not Satisfiable"))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            fallback(StatusCode::RANGE_NOT_SATISFIABLE)
        })
}

/// Build 200 response for a static file
///
/// `Content-Length` always carries the file size, including for HEAD.
pub fn build_file_response(
    data: Vec<u8>,
    file_size: u64,
    meta: &FileMeta<'_>,
    is_head: bool,
) -> Response<GatewayBody> {
    let body = if is_head {
        body::empty()
    } else {
        body::full(data)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, meta.content_type)
        .header(header::CONTENT_LENGTH, file_size)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::ETAG, meta.etag)
        .header(header::CACHE_CONTROL, meta.cache.to_header_value())
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    data: Vec<u8>,
    range: ByteRange,
    file_size: u64,
    meta: &FileMeta<'_>,
    is_head: bool,
) -> Response<GatewayBody> {
    let body = if is_head {
        body::empty()
    } else {
        body::full(data)
    };

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_TYPE, meta.content_type)
        .header(header::CONTENT_LENGTH, range.len())
        .header(header::CONTENT_RANGE, range.content_range(file_size))
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::ETAG, meta.etag)
        .header(header::CACHE_CONTROL, meta.cache.to_header_value())
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

fn fallback(status: StatusCode) -> Response<GatewayBody> {
    let mut response = Response::new(body::empty());
    *response.status_mut() = status;
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    tracing::error!(status, error = %error, "Failed to build response");
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_error_response_is_plain_text() {
        let response = build_error_response(&GatewayError::Timeout);
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"504 Gateway Timeout");
    }

    #[tokio::test]
    async fn test_head_keeps_length_but_drops_body() {
        let meta = FileMeta {
            content_type: "text/plain; charset=utf-8",
            etag: "\"1\"",
            cache: CachePolicy::default(),
        };
        let response = build_file_response(b"hello".to_vec(), 5, &meta, true);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "5");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[test]
    fn test_partial_headers() {
        let meta = FileMeta {
            content_type: "video/mp4",
            etag: "\"1\"",
            cache: CachePolicy::default(),
        };
        let range = ByteRange { start: 10, end: 19 };
        let response = build_partial_response(vec![0; 10], range, 100, &meta, false);
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 10-19/100");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "10");
    }
}
