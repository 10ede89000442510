//! Header construction, forwarding, and hop-by-hop stripping.
//!
//! [`build_forwarded_headers`] clones the client headers, strips
//! hop-by-hop headers, rewrites `Host` for the upstream, and adds proxy
//! metadata (`X-Forwarded-For`, `X-Real-IP`, `X-Forwarded-Host`,
//! `X-Forwarded-Proto`, `Via`, `X-Correlation-Id`).

use std::sync::LazyLock;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

pub const CORRELATION_ID: &str = "x-correlation-id";
const VIA: &str = concat!("1.1 edgeport/", env!("CARGO_PKG_VERSION"));

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-authenticate",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
}

/// Strip hop-by-hop headers and `content-length` from a buffered upstream
/// response. Axum sets the correct length from the collected body.
pub fn strip_response_hop_by_hop(headers: &mut HeaderMap) {
    strip_hop_by_hop(headers);
    headers.remove(hyper::header::CONTENT_LENGTH);
}

/// Strip hop-by-hop headers from a streamed upstream response.
///
/// `content-length` is kept since the body passes through unchanged.
pub fn strip_streamed_hop_by_hop(headers: &mut HeaderMap) {
    strip_hop_by_hop(headers);
}

/// Reuse the client's correlation id or mint a new one.
#[must_use]
pub fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(CORRELATION_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from)
}

pub fn build_forwarded_headers(
    original: &HeaderMap,
    client_ip: &str,
    upstream_authority: &str,
    correlation_id: &str,
) -> HeaderMap {
    let mut headers = original.clone();
    strip_hop_by_hop(&mut headers);

    if let Ok(val) = HeaderValue::from_str(upstream_authority) {
        headers.insert("host", val);
    }

    // X-Forwarded-For: append to chain
    let xff = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map_or_else(
            || client_ip.to_string(),
            |existing| format!("{existing}, {client_ip}"),
        );
    if let Ok(val) = HeaderValue::from_str(&xff) {
        headers.insert("x-forwarded-for", val);
    }

    // X-Real-IP (first IP in chain)
    let real_ip = xff.split(',').next().unwrap_or(client_ip).trim();
    if let Ok(val) = HeaderValue::from_str(real_ip) {
        headers.insert("x-real-ip", val);
    }

    // Upstreams are reached over plain HTTP; so is the listener.
    headers.insert("x-forwarded-proto", HeaderValue::from_static("http"));

    if let Some(original_host) = original.get("host") {
        headers.insert("x-forwarded-host", original_host.clone());
    }

    headers.insert("via", HeaderValue::from_static(VIA));

    if let Ok(val) = HeaderValue::from_str(correlation_id) {
        headers.insert(CORRELATION_ID, val);
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forwarded(original: &HeaderMap) -> HeaderMap {
        build_forwarded_headers(original, "10.0.0.1", "127.0.0.1:8080", "test-id")
    }

    #[test]
    fn strips_hop_by_hop() {
        let mut original = HeaderMap::new();
        original.insert("connection", "keep-alive".parse().unwrap());
        original.insert("upgrade", "websocket".parse().unwrap());
        original.insert("content-type", "application/json".parse().unwrap());

        let result = forwarded(&original);

        assert!(result.get("connection").is_none());
        assert!(result.get("upgrade").is_none());
        assert!(result.get("content-type").is_some());
    }

    #[test]
    fn rewrites_host_and_records_original() {
        let mut original = HeaderMap::new();
        original.insert("host", "edge.example.com".parse().unwrap());

        let result = forwarded(&original);

        assert_eq!(result.get("host").unwrap(), "127.0.0.1:8080");
        assert_eq!(result.get("x-forwarded-host").unwrap(), "edge.example.com");
        assert_eq!(result.get("x-forwarded-proto").unwrap(), "http");
        assert!(result.get("via").unwrap().to_str().unwrap().starts_with("1.1 edgeport"));
    }

    #[test]
    fn appends_x_forwarded_for() {
        let mut original = HeaderMap::new();
        original.insert("x-forwarded-for", "1.2.3.4".parse().unwrap());

        let result = forwarded(&original);

        assert_eq!(result.get("x-forwarded-for").unwrap(), "1.2.3.4, 10.0.0.1");
        assert_eq!(result.get("x-real-ip").unwrap(), "1.2.3.4");
    }

    #[test]
    fn keeps_authorization_for_upstream() {
        let mut original = HeaderMap::new();
        original.insert("authorization", "Bearer abc".parse().unwrap());
        assert_eq!(forwarded(&original).get("authorization").unwrap(), "Bearer abc");
    }

    #[test]
    fn correlation_id_is_propagated_or_generated() {
        let mut original = HeaderMap::new();
        original.insert(CORRELATION_ID, "my-id".parse().unwrap());
        assert_eq!(correlation_id(&original), "my-id");

        let generated = correlation_id(&HeaderMap::new());
        assert!(uuid::Uuid::parse_str(&generated).is_ok());

        assert_eq!(forwarded(&original).get(CORRELATION_ID).unwrap(), "test-id");
    }

    #[test]
    fn streamed_response_keeps_content_length() {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", "5".parse().unwrap());
        headers.insert("transfer-encoding", "chunked".parse().unwrap());
        let mut buffered = headers.clone();

        strip_streamed_hop_by_hop(&mut headers);
        strip_response_hop_by_hop(&mut buffered);

        assert!(headers.get("content-length").is_some());
        assert!(headers.get("transfer-encoding").is_none());
        assert!(buffered.get("content-length").is_none());
    }
}
