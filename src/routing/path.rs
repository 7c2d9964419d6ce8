//! Request path sanitising module
//!
//! Turns a raw request path into segments that are safe to join onto the
//! static root. Anything that could reach outside the root is rejected.

use std::path::PathBuf;

use crate::error::GatewayError;

/// Decoded, normalised request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    segments: Vec<String>,
    trailing_slash: bool,
}

impl RequestPath {
    /// Parse a raw (still percent-encoded) URI path
    ///
    /// Empty and `.` segments are dropped and `..` removes the previous
    /// segment. A `..` with nothing left to remove, invalid
    /// percent-encoding, non-UTF-8 bytes, NUL bytes and backslashes make the
    /// path malformed.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let decoded = percent_decode(raw)
            .ok_or_else(|| GatewayError::MalformedPath(format!("bad percent-encoding in {raw}")))?;

        let mut segments: Vec<String> = Vec::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(GatewayError::MalformedPath(format!(
                            "{raw} escapes the static root"
                        )));
                    }
                }
                s if s.contains(['\0', '\\']) => {
                    return Err(GatewayError::MalformedPath(format!(
                        "forbidden character in {raw}"
                    )));
                }
                s => segments.push(s.to_owned()),
            }
        }

        Ok(Self {
            trailing_slash: decoded.ends_with('/') && !segments.is_empty(),
            segments,
        })
    }

    /// True when the request named a directory explicitly (`/docs/`)
    pub const fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// True when any segment is a dotfile or dot-directory
    pub fn has_dotfile(&self) -> bool {
        self.segments.iter().any(|s| s.starts_with('.'))
    }

    /// Relative filesystem path for joining onto the static root
    pub fn to_relative_path(&self) -> PathBuf {
        self.segments.iter().collect()
    }
}

/// Decode `%XX` escapes; `None` for truncated escapes or non-UTF-8 results
fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_value(*bytes.get(i + 1)?)?;
            let lo = hex_value(*bytes.get(i + 2)?)?;
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).ok()
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_root() {
        let path = RequestPath::parse("/").unwrap();
        assert!(!path.has_trailing_slash());
        assert_eq!(path.to_relative_path(), PathBuf::new());
    }

    #[test]
    fn test_normalises_dots_and_slashes() {
        let path = RequestPath::parse("/css//./site/../app.css").unwrap();
        assert_eq!(path.to_relative_path(), Path::new("css").join("app.css"));
    }

    #[test]
    fn test_decodes_percent_escapes() {
        let path = RequestPath::parse("/my%20file.txt").unwrap();
        assert_eq!(path.to_relative_path(), PathBuf::from("my file.txt"));
    }

    #[test]
    fn test_trailing_slash() {
        assert!(RequestPath::parse("/docs/").unwrap().has_trailing_slash());
        assert!(!RequestPath::parse("/docs").unwrap().has_trailing_slash());
    }

    #[test]
    fn test_rejects_escape_attempts() {
        for raw in [
            "/..",
            "/../etc/passwd",
            "/a/../../secret",
            "/%2e%2e/secret",
            "/%2E%2E%2fsecret",
            "/a\\..\\b",
            "/nul%00byte",
            "/bad%zzescape",
            "/truncated%2",
            "/%ff%fe",
        ] {
            let result = RequestPath::parse(raw);
            assert!(
                matches!(result, Err(GatewayError::MalformedPath(_))),
                "{raw} should be malformed"
            );
        }
    }

    #[test]
    fn test_dotfiles() {
        assert!(RequestPath::parse("/.env").unwrap().has_dotfile());
        assert!(RequestPath::parse("/.git/config").unwrap().has_dotfile());
        assert!(!RequestPath::parse("/app.js").unwrap().has_dotfile());
    }
}
