//! Chat-completion edge proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                     EDGE PROXY                       │
//!   Browser          │  ┌──────┐   ┌───────────┐   ┌──────────┐   ┌───────┐ │
//!   ─────────────────┼─▶│ CORS │──▶│ admission │──▶│ validate │──▶│forward│─┼──▶ Upstream
//!                    │  └──┬───┘   └───────────┘   └──────────┘   └───┬───┘ │    API
//!                    │     │ OPTIONS → 204                            │     │
//!   ◀────────────────┼─────┴──────────────── sanitize ◀───────────────┘     │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use chat_edge_proxy::cli::Cli;
use chat_edge_proxy::observability::{logging, metrics};
use chat_edge_proxy::{HttpServer, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    logging::init_logging(&config.observability);
    tracing::info!("chat-edge-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        origin_policy = ?config.cors.origin_policy,
        rate_limit_enabled = config.rate_limit.enabled,
        max_requests = config.rate_limit.max_requests,
        window_ms = config.rate_limit.window_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
