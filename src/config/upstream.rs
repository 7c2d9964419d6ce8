// Upstream origin module
// Parses and holds the backend origin requests are forwarded to

use hyper::http::uri::{Authority, Uri};

use crate::error::GatewayError;

/// Parsed upstream origin
#[derive(Debug, Clone)]
pub struct Upstream {
    authority: Authority,
    host: String,
    port: u16,
    /// Path prefix of the origin URL, without trailing slash (may be empty)
    base_path: String,
}

impl Upstream {
    /// Parse an `http://host[:port][/base]` origin
    ///
    /// Only plain HTTP is accepted; TLS to the upstream is out of scope.
    pub fn parse(url: &str) -> Result<Self, GatewayError> {
        let uri: Uri = url
            .parse()
            .map_err(|e| GatewayError::Config(format!("invalid upstream '{url}': {e}")))?;

        match uri.scheme_str() {
            Some("http") => {}
            Some(other) => {
                return Err(GatewayError::Config(format!(
                    "unsupported upstream scheme '{other}' (only http is supported)"
                )))
            }
            None => {
                return Err(GatewayError::Config(format!(
                    "upstream '{url}' is missing a scheme"
                )))
            }
        }

        let authority = uri
            .authority()
            .cloned()
            .ok_or_else(|| GatewayError::Config(format!("upstream '{url}' is missing a host")))?;
        let host = authority.host().to_owned();
        let port = authority.port_u16().unwrap_or(80);
        let base_path = uri.path().trim_end_matches('/').to_owned();

        Ok(Self {
            authority,
            host,
            port,
            base_path,
        })
    }

    pub const fn authority(&self) -> &Authority {
        &self.authority
    }

    /// `host:port` suitable for `TcpStream::connect`
    pub fn connect_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Origin as it appears in absolute URLs, e.g. `http://localhost:3001`
    pub fn origin(&self) -> String {
        format!("http://{}", self.authority)
    }

    /// Join the origin's base path with an already rewritten path-and-query
    pub fn target(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_path, path_and_query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_port() {
        let upstream = Upstream::parse("http://localhost:3001").unwrap();
        assert_eq!(upstream.connect_addr(), "localhost:3001");
        assert_eq!(upstream.authority().as_str(), "localhost:3001");
        assert_eq!(upstream.origin(), "http://localhost:3001");
        assert_eq!(upstream.target("/users?x=1"), "/users?x=1");
    }

    #[test]
    fn test_parse_default_port() {
        let upstream = Upstream::parse("http://backend.internal").unwrap();
        assert_eq!(upstream.connect_addr(), "backend.internal:80");
    }

    #[test]
    fn test_base_path_is_prepended() {
        let upstream = Upstream::parse("http://127.0.0.1:8080/v2/").unwrap();
        assert_eq!(upstream.target("/users"), "/v2/users");
    }

    #[test]
    fn test_rejects_https_and_missing_scheme() {
        assert!(Upstream::parse("https://localhost:3001").is_err());
        assert!(Upstream::parse("localhost:3001").is_err());
        assert!(Upstream::parse("not a url").is_err());
    }
}
