//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → handler.rs (method dispatch, stage ordering)
//!     → request.rs (bearer shape, JSON body with `model`)
//!     → forward.rs (POST to the upstream, stream the reply)
//!     → response.rs (strip CSP / hop-by-hop, apply origin policy)
//!     → Send to client
//! ```

pub mod forward;
pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use forward::Forwarder;
pub use server::{AppState, HttpServer};
