//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → owned by HttpServer, pieces handed to each stage
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CorsConfig, ListenerConfig, ObservabilityConfig, OriginPolicy, ProxyConfig, RateLimitConfig,
    SecurityConfig, UpstreamConfig, DEFAULT_UPSTREAM_URL,
};
pub use validation::{validate_config, ValidationError};
