//! Header rules shared by the forwarder and the response sanitizer.
//!
//! # Responsibilities
//! - Allow-list of inbound headers that may reach the upstream
//! - Strip hop-by-hop headers from upstream responses
//! - Strip content security policies that would block the calling frontend

use axum::http::{header, HeaderMap, HeaderName};

/// Inbound headers copied to the upstream request when present.
/// Everything else (cookies, origin, host, ...) is dropped.
pub const FORWARDED_REQUEST_HEADERS: [HeaderName; 4] = [
    header::USER_AGENT,
    header::ACCEPT,
    header::ACCEPT_LANGUAGE,
    header::ACCEPT_ENCODING,
];

/// Legacy CSP header some upstreams still send.
pub const X_CONTENT_SECURITY_POLICY: HeaderName =
    HeaderName::from_static("x-content-security-policy");

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove connection-scoped headers; the server re-frames the body itself.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Remove `Content-Security-Policy` and `X-Content-Security-Policy`.
pub fn strip_content_security_policy(headers: &mut HeaderMap) {
    headers.remove(header::CONTENT_SECURITY_POLICY);
    headers.remove(X_CONTENT_SECURITY_POLICY);
}
