//! HTTP protocol layer module
//!
//! Protocol-level helpers shared by the static resolver and the proxy
//! forwarder, decoupled from the dispatch logic.

pub mod body;
pub mod cache;
pub mod headers;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::GatewayBody;
pub use range::parse_range_header;
pub use response::{build_304_response, build_416_response, build_error_response};
