//! devgate: local development gateway
//!
//! Serves files from a static directory and forwards every other request to
//! a backend origin, so a frontend and its API share one origin during
//! development.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use config::{Config, GatewayState};
pub use error::GatewayError;
