//! Routing module
//!
//! Path handling for both pipeline stages:
//! - Sanitising request paths before they touch the static root
//! - Prefix rewriting before requests are forwarded upstream

mod path;
mod rewrite;

pub use path::RequestPath;
pub use rewrite::{match_rule, rewrite_path, rewrite_path_and_query};
