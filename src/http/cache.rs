//! HTTP cache control module
//!
//! Provides `ETag` generation, conditional request handling and the
//! `Cache-Control` policy applied to static responses.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

/// Generate a strong `ETag` from file size and modification time
///
/// Hashing metadata instead of content keeps `HEAD` and 304 checks from
/// reading the file.
pub fn generate_etag(len: u64, modified: Option<SystemTime>) -> String {
    let mut hasher = DefaultHasher::new();
    len.hash(&mut hasher);
    modified.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{len:x}-{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Weak validators: `W/"abc123"`
/// - Wildcard: `*`
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').any(|e| {
            let e = e.trim();
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// Cache control policy for static responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Public cache with specified max-age (seconds)
    Public(u32),
    /// No cache
    NoCache,
}

impl CachePolicy {
    /// Policy used for static files given the configured `max_age`
    pub const fn for_static(max_age: u32) -> Self {
        Self::Public(max_age)
    }

    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::NoCache => "no-cache".to_string(),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::Public(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_generate_etag() {
        let etag = generate_etag(11, None);
        assert!(etag.starts_with("\"b-"));
        assert!(etag.ends_with('"'));
    }

    #[test]
    fn test_etag_changes_with_mtime() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let t1 = t0 + Duration::from_secs(1);
        assert_eq!(generate_etag(5, Some(t0)), generate_etag(5, Some(t0)));
        assert_ne!(generate_etag(5, Some(t0)), generate_etag(5, Some(t1)));
        assert_ne!(generate_etag(5, Some(t0)), generate_etag(6, Some(t0)));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("W/\"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_cache_policy() {
        assert_eq!(
            CachePolicy::for_static(3600).to_header_value(),
            "public, max-age=3600"
        );
        assert_eq!(CachePolicy::default().to_header_value(), "public, max-age=0");
        assert_eq!(CachePolicy::NoCache.to_header_value(), "no-cache");
    }
}
