//! Request handler module
//!
//! Static file serving first, reverse proxying for everything it passes on.

pub mod proxy;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
