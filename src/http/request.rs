//! Request validation.
//!
//! # Responsibilities
//! - Check the `Authorization` header is a bearer credential (shape only)
//! - Parse the buffered body as JSON and require a `model` field
//!
//! The handler checks the header before reading the body, so a bad credential
//! is reported regardless of the body. The body is buffered once; parsing
//! borrows the bytes and hands back the value the forwarder re-serializes.

use axum::http::{header, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::error::{ProxyError, INVALID_JSON_FALLBACK};

/// Case-sensitive scheme prefix, one space.
pub const BEARER_PREFIX: &[u8] = b"Bearer ";

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Caller's header, byte-for-byte.
    pub authorization: HeaderValue,
    /// Parsed body; contains `model`.
    pub body: Value,
}

/// Return the caller's `Authorization` header if it starts with `Bearer `.
///
/// The token itself is never inspected.
pub fn bearer_authorization(headers: &HeaderMap) -> Result<HeaderValue, ProxyError> {
    match headers.get(header::AUTHORIZATION) {
        Some(value) if value.as_bytes().starts_with(BEARER_PREFIX) => Ok(value.clone()),
        _ => Err(ProxyError::Unauthorized),
    }
}

/// Parse a chat-completion body. Only the presence of `model` is checked.
pub fn parse_chat_body(bytes: &[u8]) -> Result<Value, ProxyError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ProxyError::InvalidJson(INVALID_JSON_FALLBACK.to_string()));
    }

    let body: Value =
        serde_json::from_slice(bytes).map_err(|e| ProxyError::InvalidJson(e.to_string()))?;

    if body.get("model").is_none() {
        return Err(ProxyError::MissingModel);
    }
    Ok(body)
}
