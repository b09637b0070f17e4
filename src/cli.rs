//! Command-line interface.
//!
//! Flags override values from the config file, and the merged result is
//! validated as a whole.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{load_config, validate_config, ConfigError, OriginPolicy, ProxyConfig};

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "chat-edge-proxy")]
#[command(about = "CORS-relaxing, rate-limited edge proxy for a chat-completion API")]
pub struct Cli {
    /// TOML config file. Every setting has a default, so this is optional.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8080.
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Upstream chat-completion URL.
    #[arg(long)]
    pub upstream_url: Option<String>,

    /// Only allow this browser origin (enables credentials).
    #[arg(long)]
    pub allowed_origin: Option<String>,

    /// Log level for this crate and tower_http.
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Load the config file (if any), apply overrides, validate.
    pub fn load_config(&self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };
        self.apply_overrides(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut ProxyConfig) {
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(url) = &self.upstream_url {
            config.upstream.url = url.clone();
        }
        if let Some(origin) = &self.allowed_origin {
            config.cors.origin_policy = OriginPolicy::Fixed(origin.clone());
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}
