//! Gateway error types.

use hyper::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed request path: {0}")]
    MalformedPath(String),

    #[error("Failed to read static file: {0}")]
    StaticIo(#[source] std::io::Error),

    #[error("Upstream connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] hyper::Error),

    #[error("Upstream timeout")]
    Timeout,

    #[error("Request build failed: {0}")]
    RequestBuildFailed(#[from] hyper::http::Error),
}

impl From<config::ConfigError> for GatewayError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl GatewayError {
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::MalformedPath(_) => "malformed_path",
            Self::StaticIo(_) => "static_io_error",
            Self::ConnectionFailed(_) => "connection_failed",
            Self::Upstream(_) => "upstream_error",
            Self::Timeout => "timeout",
            Self::RequestBuildFailed(_) => "request_build_failed",
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedPath(_) => StatusCode::BAD_REQUEST,
            Self::ConnectionFailed(_) | Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Config(_) | Self::StaticIo(_) | Self::RequestBuildFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to clients
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MalformedPath(_) => "400 Bad Request",
            Self::ConnectionFailed(_) | Self::Upstream(_) => "502 Bad Gateway",
            Self::Timeout => "504 Gateway Timeout",

            // Hide internal details
            Self::Config(_) | Self::StaticIo(_) | Self::RequestBuildFailed(_) => {
                "500 Internal Server Error"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes() {
        assert_eq!(
            GatewayError::MalformedPath("/..".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::ConnectionFailed("refused".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GatewayError::Timeout.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert_eq!(
            GatewayError::StaticIo(denied).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_messages_hide_internals() {
        let err = GatewayError::ConnectionFailed("127.0.0.1:1: connection refused".into());
        assert_eq!(err.public_message(), "502 Bad Gateway");
        assert_eq!(err.error_type(), "connection_failed");

        let err = GatewayError::Config("secret path".into());
        assert!(!err.public_message().contains("secret"));
    }
}
