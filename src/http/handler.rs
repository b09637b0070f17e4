//! The per-request pipeline.
//!
//! ```text
//! OPTIONS → preflight (204)                                   ─┐
//! POST    → admission → validation → forward → sanitize        ├─▶ response
//! other   → 405                                               ─┘
//! ```
//!
//! Every stage either passes the request on or ends it with its own
//! `ProxyError`; whatever comes out gets the origin headers.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, State},
    http::{Method, Request},
    response::{IntoResponse, Response},
};

use crate::error::ProxyError;
use crate::http::request::{bearer_authorization, parse_chat_body, ChatRequest};
use crate::http::response::sanitize_upstream_response;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::rate_limit::{admit, client_key};

/// Entry point for every path and method.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %request.uri().path(),
        "Handling request"
    );

    let response = match run_pipeline(&state, request).await {
        Ok(response) => response,
        Err(err) => {
            if !matches!(err, ProxyError::RateLimited | ProxyError::Upstream(_)) {
                tracing::warn!(request_id = %request_id, status = %err.status(), error = %err, "Request rejected");
            }
            let mut response = err.into_response();
            state.cors.apply(response.headers_mut());
            response
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

async fn run_pipeline(state: &AppState, request: Request<Body>) -> Result<Response, ProxyError> {
    match *request.method() {
        Method::OPTIONS => return Ok(state.cors.preflight(request.headers())),
        Method::POST => {}
        _ => return Err(ProxyError::MethodNotAllowed),
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer, state.client_ip_header.as_ref());
    admit(state.admission.as_ref(), &key)?;

    let (parts, body) = request.into_parts();
    let authorization = bearer_authorization(&parts.headers)?;
    let bytes = to_bytes(body, state.max_body_size)
        .await
        .map_err(|_| ProxyError::BodyUnreadable)?;
    let chat = ChatRequest {
        authorization,
        body: parse_chat_body(&bytes)?,
    };

    let upstream = state.forwarder.forward(&parts.headers, &chat).await?;
    Ok(sanitize_upstream_response(upstream, &state.cors))
}
