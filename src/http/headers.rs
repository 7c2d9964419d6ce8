//! Proxy header handling module
//!
//! Hop-by-hop stripping, `X-Forwarded-*` headers and the optional response
//! rewrites (`Location`, `Set-Cookie` domain).

use std::net::IpAddr;

use hyper::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Headers that describe a single transport hop and must not be forwarded
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
];

/// Remove hop-by-hop headers, including any listed in `Connection`
///
/// `Upgrade` is removed as well: connection upgrades are not relayed.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove(header::UPGRADE);
}

/// Append the client to `X-Forwarded-For` and record the original host and scheme
pub fn set_forwarded(headers: &mut HeaderMap, client_ip: IpAddr, original_host: Option<&str>) {
    let forwarded_for = match headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        Some(prior) if !prior.trim().is_empty() => format!("{prior}, {client_ip}"),
        _ => client_ip.to_string(),
    };
    if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
        headers.insert("x-forwarded-for", value);
    }

    if !headers.contains_key("x-forwarded-host") {
        if let Some(value) = original_host.and_then(|h| HeaderValue::from_str(h).ok()) {
            headers.insert("x-forwarded-host", value);
        }
    }

    if !headers.contains_key("x-forwarded-proto") {
        headers.insert("x-forwarded-proto", HeaderValue::from_static("http"));
    }
}

/// Point a `Location` header that targets the upstream origin at the gateway instead
///
/// Relative locations and locations on other hosts are left untouched.
pub fn rewrite_location(headers: &mut HeaderMap, upstream_origin: &str, gateway_host: &str) {
    let Some(location) = headers
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
    else {
        return;
    };

    let Some(rest) = location.strip_prefix(upstream_origin) else {
        return;
    };
    if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('?')) {
        return;
    }

    let rewritten = format!("http://{gateway_host}{rest}");
    if let Ok(value) = HeaderValue::from_str(&rewritten) {
        headers.insert(header::LOCATION, value);
    }
}

/// Replace the `Domain` attribute of every `Set-Cookie`; an empty domain removes it
pub fn rewrite_cookie_domain(headers: &mut HeaderMap, domain: &str) {
    let cookies: Vec<HeaderValue> = headers
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|cookie| {
            cookie
                .to_str()
                .ok()
                .map(|c| rewrite_single_cookie(c, domain))
                .and_then(|c| HeaderValue::from_str(&c).ok())
                .unwrap_or_else(|| cookie.clone())
        })
        .collect();

    if cookies.is_empty() {
        return;
    }

    headers.remove(header::SET_COOKIE);
    for cookie in cookies {
        headers.append(header::SET_COOKIE, cookie);
    }
}

fn rewrite_single_cookie(cookie: &str, domain: &str) -> String {
    cookie
        .split(';')
        .filter_map(|attr| {
            let is_domain = attr
                .trim_start()
                .get(..7)
                .is_some_and(|name| name.eq_ignore_ascii_case("domain="));
            if !is_domain {
                Some(attr.to_string())
            } else if domain.is_empty() {
                None
            } else {
                Some(format!(" Domain={domain}"))
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", HeaderValue::from_static("keep-alive, x-secret"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("upgrade", HeaderValue::from_static("websocket"));
        headers.insert("x-secret", HeaderValue::from_static("1"));
        headers.insert("content-type", HeaderValue::from_static("text/plain"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key("content-type"));
    }

    #[test]
    fn test_set_forwarded_appends() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));

        set_forwarded(&mut headers, "127.0.0.1".parse().unwrap(), Some("localhost:3000"));

        assert_eq!(headers["x-forwarded-for"], "10.0.0.1, 127.0.0.1");
        assert_eq!(headers["x-forwarded-host"], "localhost:3000");
        assert_eq!(headers["x-forwarded-proto"], "http");
    }

    #[test]
    fn test_rewrite_location() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::LOCATION,
            HeaderValue::from_static("http://localhost:3001/login?next=/"),
        );
        rewrite_location(&mut headers, "http://localhost:3001", "localhost:3000");
        assert_eq!(headers[header::LOCATION], "http://localhost:3000/login?next=/");
    }

    #[test]
    fn test_rewrite_location_leaves_other_hosts() {
        let mut headers = HeaderMap::new();
        headers.insert(header::LOCATION, HeaderValue::from_static("http://localhost:30010/"));
        rewrite_location(&mut headers, "http://localhost:3001", "localhost:3000");
        assert_eq!(headers[header::LOCATION], "http://localhost:30010/");

        headers.insert(header::LOCATION, HeaderValue::from_static("/relative"));
        rewrite_location(&mut headers, "http://localhost:3001", "localhost:3000");
        assert_eq!(headers[header::LOCATION], "/relative");
    }

    #[test]
    fn test_rewrite_cookie_domain() {
        let mut headers = HeaderMap::new();
        headers.append(
            header::SET_COOKIE,
            HeaderValue::from_static("sid=abc; Domain=backend.local; Path=/"),
        );
        headers.append(header::SET_COOKIE, HeaderValue::from_static("theme=dark"));

        rewrite_cookie_domain(&mut headers, "localhost");

        let cookies: Vec<_> = headers.get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0], "sid=abc; Domain=localhost; Path=/");
        assert_eq!(cookies[1], "theme=dark");
    }

    #[test]
    fn test_remove_cookie_domain() {
        assert_eq!(
            rewrite_single_cookie("sid=abc; domain=backend.local; HttpOnly", ""),
            "sid=abc; HttpOnly"
        );
    }
}
