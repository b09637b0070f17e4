//! Edge proxy for browser-facing chat-completion requests.
//!
//! Accepts `POST`s from one configured origin (or any origin), rate limits
//! per client, checks the request shape, forwards to a single upstream with
//! the caller's bearer credential, and relaxes response headers so a web
//! frontend can read the result.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::ProxyConfig;
pub use error::{ProxyError, StartupError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
