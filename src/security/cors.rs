//! Cross-origin policy.
//!
//! One `CorsPolicy` is built from the configured `OriginPolicy` at startup and
//! applied to every response the proxy produces, including errors.
//!
//! | Policy     | Allow-Origin | Credentials | Preflight Allow-Headers          |
//! |------------|--------------|-------------|----------------------------------|
//! | `Fixed`    | the origin   | `true`      | echoed from the request, if sent |
//! | `Wildcard` | `*`          | never       | `Content-Type, Authorization`    |

use axum::{
    body::Body,
    http::{
        header::{self, InvalidHeaderValue},
        HeaderMap, HeaderValue, Response, StatusCode,
    },
};

use crate::config::OriginPolicy;

const ALLOWED_METHODS: &str = "POST, OPTIONS";
const STATIC_ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Resolved origin policy, ready to stamp onto responses.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origin: HeaderValue,
    credentials: bool,
}

impl CorsPolicy {
    pub fn new(policy: &OriginPolicy) -> Result<Self, InvalidHeaderValue> {
        Ok(match policy {
            OriginPolicy::Fixed(origin) => Self {
                origin: HeaderValue::from_str(origin)?,
                credentials: true,
            },
            OriginPolicy::Wildcard => Self {
                origin: HeaderValue::from_static("*"),
                credentials: false,
            },
        })
    }

    /// The `Access-Control-Allow-Origin` value this policy emits.
    pub fn origin(&self) -> &HeaderValue {
        &self.origin
    }

    /// Overwrite the origin headers on an outgoing response.
    ///
    /// Under the wildcard policy any credentials header is removed, since
    /// browsers reject `*` combined with credentials.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, self.origin.clone());
        if self.credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        } else {
            headers.remove(header::ACCESS_CONTROL_ALLOW_CREDENTIALS);
        }
    }

    /// Answer a browser preflight. Touches no state.
    pub fn preflight(&self, request_headers: &HeaderMap) -> Response<Body> {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;

        let headers = response.headers_mut();
        self.apply(headers);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );

        if self.credentials {
            if let Some(requested) = request_headers.get(header::ACCESS_CONTROL_REQUEST_HEADERS) {
                headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
            }
        } else {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(STATIC_ALLOWED_HEADERS),
            );
        }

        response
    }
}
