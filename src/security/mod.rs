//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (answer preflights, stamp origin headers on every response)
//!     → rate_limit.rs (per-client sliding window admission)
//!     → Pass to validation and forwarding
//!
//! Upstream response:
//!     → headers.rs (strip hop-by-hop and CSP headers)
//! ```
//!
//! # Design Decisions
//! - Admission runs before validation, so malformed requests still count
//! - Bearer tokens are checked for shape only; the upstream authenticates
//! - Only an allow-list of request headers ever leaves the proxy

pub mod cors;
pub mod headers;
pub mod rate_limit;

pub use cors::CorsPolicy;
pub use rate_limit::{AdmissionControl, AllowAll, SlidingWindowLimiter};
