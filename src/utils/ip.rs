//! Client IP extraction
//!
//! Prefers forwarded headers (X-Forwarded-For, then X-Real-IP) over the
//! peer address, since the service is normally deployed behind a reverse
//! proxy. Loopback/IPv4-mapped normalization happens later in the geo
//! resolver, not here.

use std::net::IpAddr;

use actix_web::HttpRequest;

/// Whether an IP is private or localhost (such addresses never resolve in
/// a public geo database, loopback excepted via the fallback substitution).
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            // fc00::/7 (ULA), fe80::/10 (link-local), ::1
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// Extract the real client IP from a request.
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    extract_forwarded_ip_from_headers(req.headers()).or_else(|| {
        req.connection_info()
            .peer_addr()
            .map(|addr| strip_port(addr).to_string())
    })
}

/// Extract the forwarded IP from headers (X-Forwarded-For first entry,
/// then X-Real-IP).
pub fn extract_forwarded_ip_from_headers(
    headers: &actix_web::http::header::HeaderMap,
) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        })
}

/// Drop a trailing `:port` from an `ip:port` string, leaving bare IPs and
/// bracketed IPv6 literals intact.
fn strip_port(addr: &str) -> &str {
    if addr.parse::<IpAddr>().is_ok() {
        return addr;
    }
    if addr.parse::<std::net::SocketAddr>().is_ok() {
        if let Some(pos) = addr.rfind(':') {
            return addr[..pos].trim_matches(|c| c == '[' || c == ']');
        }
    }
    addr
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};

    fn headers_with(name: &str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn test_forwarded_for_takes_first_entry() {
        let headers = headers_with("x-forwarded-for", "203.0.113.7, 10.0.0.1");
        assert_eq!(
            extract_forwarded_ip_from_headers(&headers),
            Some("203.0.113.7".to_string())
        );
    }

    #[test]
    fn test_real_ip_fallback() {
        let headers = headers_with("x-real-ip", "198.51.100.4");
        assert_eq!(
            extract_forwarded_ip_from_headers(&headers),
            Some("198.51.100.4".to_string())
        );
    }

    #[test]
    fn test_no_headers_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(extract_forwarded_ip_from_headers(&headers), None);
    }

    #[test]
    fn test_is_private_or_local() {
        assert!(is_private_or_local(&"127.0.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"192.168.1.1".parse().unwrap()));
        assert!(is_private_or_local(&"::1".parse().unwrap()));
        assert!(is_private_or_local(&"fe80::1".parse().unwrap()));
        assert!(!is_private_or_local(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_or_local(&"2001:4860:4860::8888".parse().unwrap()));
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("203.0.113.7:443"), "203.0.113.7");
        assert_eq!(strip_port("203.0.113.7"), "203.0.113.7");
        assert_eq!(strip_port("::1"), "::1");
    }
}
