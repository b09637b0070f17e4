//! Upstream forwarding.
//!
//! # Responsibilities
//! - Build the outgoing POST: fixed URL, JSON body, allow-listed headers
//! - Relay the caller's `Authorization` value untouched
//! - Stream the upstream body back without buffering it
//! - Turn transport failures into a single 502 path
//!
//! # Design Decisions
//! - One attempt per request; no retries
//! - The deadline covers waiting for response headers only, so long
//!   streamed completions are not cut off
//! - No lock is held across the network call
//! - Environment proxy settings are ignored; the upstream is dialed directly

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue},
    response::Response,
};
use futures_util::TryStreamExt;
use reqwest::Url;

use crate::config::UpstreamConfig;
use crate::error::{ProxyError, StartupError, UpstreamFailure};
use crate::http::request::ChatRequest;
use crate::observability::metrics;
use crate::security::headers::FORWARDED_REQUEST_HEADERS;

/// Client for the single upstream endpoint.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    url: Url,
    response_timeout: Duration,
}

impl Forwarder {
    pub fn new(config: &UpstreamConfig) -> Result<Self, StartupError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            url: Url::parse(&config.url)?,
            response_timeout: Duration::from_secs(config.response_timeout_secs),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send the validated request upstream and hand back its response as-is.
    pub async fn forward(
        &self,
        inbound: &HeaderMap,
        request: &ChatRequest,
    ) -> Result<Response, ProxyError> {
        let body = serde_json::to_vec(&request.body)
            .map_err(|e| ProxyError::InvalidJson(e.to_string()))?;

        let send = self
            .client
            .post(self.url.clone())
            .headers(upstream_headers(inbound, &request.authorization))
            .body(body)
            .send();

        let upstream = match tokio::time::timeout(self.response_timeout, send).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(self.failed(UpstreamFailure::Transport(e))),
            Err(_) => return Err(self.failed(UpstreamFailure::Timeout(self.response_timeout))),
        };

        tracing::debug!(status = %upstream.status(), "Upstream responded");

        let status = upstream.status();
        let headers = upstream.headers().clone();
        let stream = upstream.bytes_stream().inspect_err(|e| {
            tracing::error!(error = %e, "Upstream body stream failed");
        });

        let mut response = Response::new(Body::from_stream(stream));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }

    fn failed(&self, failure: UpstreamFailure) -> ProxyError {
        tracing::error!(upstream = %self.url, error = %failure, "Upstream error");
        metrics::record_upstream_failure(failure.kind());
        ProxyError::Upstream(failure)
    }
}

/// Headers for the upstream request: JSON content type, the caller's
/// credential, then whichever allow-listed headers the caller sent.
pub fn upstream_headers(inbound: &HeaderMap, authorization: &HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::AUTHORIZATION, authorization.clone());

    for name in FORWARDED_REQUEST_HEADERS {
        if let Some(value) = inbound.get(&name) {
            headers.insert(name, value.clone());
        }
    }
    headers
}
