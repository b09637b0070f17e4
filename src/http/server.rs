//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router; every path goes to the same pipeline
//! - Wire up middleware (tracing, request ID)
//! - Own the admission store and optional idle-key sweeper
//! - Serve until the shutdown signal, then drain

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::HeaderName, routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::StartupError;
use crate::http::forward::Forwarder;
use crate::http::handler::proxy_handler;
use crate::security::cors::CorsPolicy;
use crate::security::rate_limit::{spawn_sweeper, AdmissionControl, AllowAll, SlidingWindowLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub cors: CorsPolicy,
    pub admission: Arc<dyn AdmissionControl>,
    pub forwarder: Arc<Forwarder>,
    pub client_ip_header: Option<HeaderName>,
    pub max_body_size: usize,
}

/// HTTP server for the edge proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    limiter: Option<Arc<SlidingWindowLimiter>>,
}

impl HttpServer {
    /// Create a server with the in-process sliding-window store
    /// (or no limiting when `rate_limit.enabled` is false).
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(SlidingWindowLimiter::from_config(&config.rate_limit)));

        let admission: Arc<dyn AdmissionControl> = match &limiter {
            Some(limiter) => limiter.clone(),
            None => Arc::new(AllowAll),
        };

        let mut server = Self::with_admission(config, admission)?;
        server.limiter = limiter;
        Ok(server)
    }

    /// Create a server backed by a caller-supplied admission store.
    pub fn with_admission(
        config: ProxyConfig,
        admission: Arc<dyn AdmissionControl>,
    ) -> Result<Self, StartupError> {
        let client_ip_header = config
            .rate_limit
            .client_ip_header
            .as_deref()
            .map(|name| HeaderName::from_bytes(name.as_bytes()))
            .transpose()?;

        let state = AppState {
            cors: CorsPolicy::new(&config.cors.origin_policy)?,
            admission,
            forwarder: Arc::new(Forwarder::new(&config.upstream)?),
            client_ip_header,
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(state);
        Ok(Self {
            router,
            config,
            limiter: None,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            "HTTP server starting"
        );

        let sweep_secs = self.config.rate_limit.sweep_interval_secs;
        if let (Some(limiter), true) = (&self.limiter, sweep_secs > 0) {
            spawn_sweeper(
                limiter.clone(),
                Duration::from_secs(sweep_secs),
                shutdown.resubscribe(),
            );
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
