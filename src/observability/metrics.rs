//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status
//! - `proxy_request_duration_seconds` (histogram): time to response headers
//! - `proxy_rate_limited_total` (counter): admission rejections
//! - `proxy_upstream_failures_total` (counter): transport failures by kind
//! - `proxy_tracked_clients` (gauge): keys held by the admission store
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    ::metrics::counter!(
        "proxy_requests_total",
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    ::metrics::histogram!(
        "proxy_request_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited() {
    ::metrics::counter!("proxy_rate_limited_total").increment(1);
}

pub fn record_upstream_failure(kind: &'static str) {
    ::metrics::counter!("proxy_upstream_failures_total", "kind" => kind).increment(1);
}

pub fn set_tracked_clients(count: usize) {
    ::metrics::gauge!("proxy_tracked_clients").set(count as f64);
}
