//! Response sanitizing.
//!
//! The upstream status and body stream pass through untouched. Headers are
//! kept except for connection-scoped ones and content security policies,
//! and the origin policy overwrites whatever CORS headers the upstream sent.
//! Nothing here can fail.

use axum::response::Response;

use crate::security::cors::CorsPolicy;
use crate::security::headers::{strip_content_security_policy, strip_hop_by_hop};

pub fn sanitize_upstream_response(mut response: Response, cors: &CorsPolicy) -> Response {
    let headers = response.headers_mut();
    strip_hop_by_hop(headers);
    strip_content_security_policy(headers);
    cors.apply(headers);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OriginPolicy;
    use crate::security::headers::X_CONTENT_SECURITY_POLICY;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, HeaderValue, StatusCode};

    fn upstream_response() -> Response {
        let mut response = Response::new(Body::from(r#"{"id":"chatcmpl-1"}"#));
        *response.status_mut() = StatusCode::CREATED;
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'"),
        );
        headers.insert(X_CONTENT_SECURITY_POLICY, HeaderValue::from_static("default-src 'none'"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("99"));
        response
    }

    #[tokio::test]
    async fn test_sanitize_preserves_status_body_and_headers() {
        let cors = CorsPolicy::new(&OriginPolicy::Fixed("https://chat.example.com".into())).unwrap();
        let response = sanitize_upstream_response(upstream_response(), &cors);

        assert_eq!(response.status(), StatusCode::CREATED);
        let headers = response.headers();
        assert!(headers.get(header::CONTENT_SECURITY_POLICY).is_none());
        assert!(headers.get(X_CONTENT_SECURITY_POLICY).is_none());
        assert_eq!(headers["x-ratelimit-remaining"], "99");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://chat.example.com");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"id":"chatcmpl-1"}"#);
    }

    #[test]
    fn test_sanitize_wildcard_sets_star() {
        let cors = CorsPolicy::new(&OriginPolicy::Wildcard).unwrap();
        let response = sanitize_upstream_response(upstream_response(), &cors);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .is_none());
    }
}
