//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    http::{header, HeaderMap, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use chat_edge_proxy::config::{OriginPolicy, ProxyConfig};
use chat_edge_proxy::{HttpServer, Shutdown};
use tokio::net::TcpListener;

pub const ORIGIN: &str = "https://chat.example.com";
pub const UPSTREAM_PATH: &str = "/v1/chat/completions";
pub const CHAT_COMPLETION_BODY: &str =
    r#"{"id":"chatcmpl-1","object":"chat.completion","choices":[{"index":0,"message":{"role":"assistant","content":"hi"}}]}"#;

/// A request as the mock upstream saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<RecordedRequest>>>);

impl Recorder {
    fn push(&self, request: RecordedRequest) {
        self.0.lock().unwrap().push(request);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// Start a mock upstream on an ephemeral port that records every request and
/// answers with whatever `respond` produces.
pub async fn start_mock_upstream<F, Fut>(respond: F) -> (SocketAddr, Recorder)
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let recorder = Recorder::default();
    let seen = recorder.clone();

    let app = Router::new().route(
        UPSTREAM_PATH,
        any(move |method: Method, headers: HeaderMap, body: Bytes| {
            let seen = seen.clone();
            let respond = respond.clone();
            async move {
                seen.push(RecordedRequest {
                    method,
                    headers,
                    body,
                });
                respond().await
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, recorder)
}

/// A 200 chat completion carrying both CSP headers and an upstream CORS value.
pub fn chat_completion() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_SECURITY_POLICY, "default-src 'none'"),
            (
                HeaderName::from_static("x-content-security-policy"),
                "default-src 'none'",
            ),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "https://api.example.net"),
        ],
        CHAT_COMPLETION_BODY,
    )
        .into_response()
}

/// Fixed-origin config pointed at `upstream`.
pub fn proxy_config(upstream: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.cors.origin_policy = OriginPolicy::Fixed(ORIGIN.into());
    config.upstream.url = format!("http://{upstream}{UPSTREAM_PATH}");
    config
}

/// Start the proxy on an ephemeral port.
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// An address with nothing listening on it.
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

pub fn post(client: &reqwest::Client, proxy: SocketAddr, body: &'static str) -> reqwest::RequestBuilder {
    client
        .post(format!("http://{proxy}/"))
        .header("authorization", "Bearer sk-test")
        .header("content-type", "application/json")
        .body(body)
}
