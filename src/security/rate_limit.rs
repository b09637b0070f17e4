//! Per-client admission control with a sliding window.
//!
//! Every client key owns a log of admission timestamps (ms since epoch).
//! A check prunes entries at or before `now - window`, rejects when the
//! survivors already number `max_requests`, and otherwise records `now`.
//! Exactly `max_requests` requests get through per rolling window.
//!
//! The store lives in process memory: it starts empty on restart and is not
//! shared between instances. Multi-instance deployments need a different
//! `AdmissionControl` backed by a shared store. Keys are never dropped unless
//! the optional sweeper runs, so memory grows with the number of distinct
//! clients seen.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::http::{HeaderMap, HeaderName};
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::config::RateLimitConfig;
use crate::error::ProxyError;
use crate::observability::metrics;

/// Client key used when no address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Admission decision for a client at a point in time.
///
/// `check_and_record` must be atomic per key: two concurrent calls for the
/// same key may never both observe the last free slot.
pub trait AdmissionControl: Send + Sync {
    fn check_and_record(&self, key: &str, now_ms: u64) -> bool;

    /// Number of client keys currently held, if the store tracks them.
    fn tracked_clients(&self) -> usize {
        0
    }
}

/// Admits everything. Used when rate limiting is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl AdmissionControl for AllowAll {
    fn check_and_record(&self, _key: &str, _now_ms: u64) -> bool {
        true
    }
}

/// In-process sliding-window limiter.
///
/// `DashMap::entry` holds the shard write lock for the whole
/// prune-count-append sequence, which makes each check atomic per key
/// without a global lock.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    logs: DashMap<String, VecDeque<u64>>,
    max_requests: usize,
    window_ms: u64,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            logs: DashMap::new(),
            max_requests: max_requests as usize,
            window_ms,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window_ms)
    }

    fn window_start(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.window_ms)
    }

    /// Number of admissions still inside the window for `key`.
    pub fn recent_count(&self, key: &str, now_ms: u64) -> usize {
        let start = self.window_start(now_ms);
        self.logs
            .get(key)
            .map(|log| log.iter().filter(|&&ts| ts > start).count())
            .unwrap_or(0)
    }

    /// Drop keys with no admissions left in the window. Returns how many were removed.
    pub fn sweep(&self, now_ms: u64) -> usize {
        let start = self.window_start(now_ms);
        let before = self.logs.len();
        self.logs.retain(|_, log| {
            log.retain(|&ts| ts > start);
            !log.is_empty()
        });
        before.saturating_sub(self.logs.len())
    }
}

impl AdmissionControl for SlidingWindowLimiter {
    fn check_and_record(&self, key: &str, now_ms: u64) -> bool {
        let start = self.window_start(now_ms);
        let mut log = self.logs.entry(key.to_owned()).or_default();

        log.retain(|&ts| ts > start);
        if log.len() >= self.max_requests {
            return false;
        }
        log.push_back(now_ms);
        true
    }

    fn tracked_clients(&self) -> usize {
        self.logs.len()
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Best-effort identity of the caller.
///
/// Prefers the trusted edge header (first element of a comma list), then the
/// TCP peer address, then [`UNKNOWN_CLIENT`].
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trusted_header: Option<&HeaderName>,
) -> String {
    let from_header = trusted_header
        .and_then(|name| headers.get(name))
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match (from_header, peer) {
        (Some(value), _) => value.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => UNKNOWN_CLIENT.to_string(),
    }
}

/// Run admission for one request, logging and counting rejections.
pub fn admit(admission: &dyn AdmissionControl, key: &str) -> Result<(), ProxyError> {
    let admitted = admission.check_and_record(key, now_millis());
    metrics::set_tracked_clients(admission.tracked_clients());

    if admitted {
        Ok(())
    } else {
        tracing::warn!(client = %key, "Rate limit exceeded");
        metrics::record_rate_limited();
        Err(ProxyError::RateLimited)
    }
}

/// Periodically drop idle keys until shutdown.
pub fn spawn_sweeper(
    limiter: Arc<SlidingWindowLimiter>,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = limiter.sweep(now_millis());
                    metrics::set_tracked_clients(limiter.tracked_clients());
                    if removed > 0 {
                        tracing::debug!(removed, remaining = limiter.tracked_clients(), "Swept idle clients");
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    })
}
