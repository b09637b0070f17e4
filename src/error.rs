//! Error types.
//!
//! `ProxyError` is everything a caller can see. Each variant carries its own
//! status and body; the handler layers the CORS headers on top.
//! `StartupError` covers failures before the listener accepts traffic.

use std::time::Duration;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Fallback message when the body is empty or unparseable without detail.
pub const INVALID_JSON_FALLBACK: &str = "Invalid or empty JSON body";

/// Client-visible pipeline failures.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Too many requests")]
    RateLimited,

    #[error("Missing or invalid Authorization header.")]
    Unauthorized,

    #[error("Missing 'model' in request body")]
    MissingModel,

    #[error("{0}")]
    InvalidJson(String),

    #[error("Request body too large or unreadable")]
    BodyUnreadable,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Failed to connect to the target API")]
    Upstream(#[source] UpstreamFailure),
}

/// Why the upstream call produced no response.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamFailure {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("no upstream response within {0:?}")]
    Timeout(Duration),
}

impl UpstreamFailure {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamFailure::Transport(e) if e.is_connect() => "connect",
            UpstreamFailure::Transport(e) if e.is_timeout() => "timeout",
            UpstreamFailure::Transport(_) => "transport",
            UpstreamFailure::Timeout(_) => "timeout",
        }
    }
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::Unauthorized => StatusCode::UNAUTHORIZED,
            ProxyError::MissingModel | ProxyError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ProxyError::BodyUnreadable => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));

        match self {
            ProxyError::RateLimited => (status, "Too many requests").into_response(),
            ProxyError::MethodNotAllowed => {
                (status, [(header::ALLOW, "POST, OPTIONS")], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

/// Failures while assembling the server from an already validated config.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid allowed origin: {0}")]
    InvalidOrigin(#[from] axum::http::header::InvalidHeaderValue),

    #[error("invalid client IP header name: {0}")]
    InvalidHeaderName(#[from] axum::http::header::InvalidHeaderName),

    #[error("invalid upstream URL: {0}")]
    InvalidUpstreamUrl(#[from] url::ParseError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}
