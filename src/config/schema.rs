//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Upstream chat-completion endpoint used when none is configured.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.electronhub.ai/v1/chat/completions";

/// Root configuration for the edge proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Cross-origin policy applied to every response.
    pub cors: CorsConfig,

    /// Per-client admission control.
    pub rate_limit: RateLimitConfig,

    /// Upstream API settings.
    pub upstream: UpstreamConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Which origin the browser is allowed to call us from.
///
/// In TOML this is either `origin_policy = "wildcard"` or
/// `origin_policy = { fixed = "https://app.example.com" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginPolicy {
    /// A single origin; credentials allowed, preflight headers echoed.
    Fixed(String),
    /// Any origin; never combined with credentials.
    #[default]
    Wildcard,
}

/// CORS configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub origin_policy: OriginPolicy,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Requests admitted per client within one window.
    pub max_requests: u32,

    /// Sliding window length in milliseconds.
    pub window_ms: u64,

    /// Trusted header carrying the real client address (e.g. `cf-connecting-ip`).
    pub client_ip_header: Option<String>,

    /// Interval for dropping idle clients from the store. 0 disables sweeping.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 60,
            window_ms: 60_000,
            client_ip_header: None,
            sweep_interval_secs: 0,
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Full URL requests are POSTed to.
    pub url: String,

    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Time to wait for upstream response headers in seconds.
    /// The streamed body is not bounded by this.
    pub response_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPSTREAM_URL.to_string(),
            connect_timeout_secs: 10,
            response_timeout_secs: 120,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
