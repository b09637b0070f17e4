//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and cross-field rules.
//! All failures are collected so an operator sees every problem at once.

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use url::Url;

use crate::config::schema::{OriginPolicy, ProxyConfig};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if let OriginPolicy::Fixed(origin) = &config.cors.origin_policy {
        if origin.trim().is_empty() {
            errors.push(ValidationError::new("cors.origin_policy", "fixed origin is empty"));
        } else if origin == "*" {
            errors.push(ValidationError::new(
                "cors.origin_policy",
                "use \"wildcard\" instead of a fixed \"*\" origin",
            ));
        } else if HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::new(
                "cors.origin_policy",
                format!("'{origin}' is not a valid header value"),
            ));
        }
    }

    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::new("rate_limit.max_requests", "must be greater than 0"));
    }
    if config.rate_limit.window_ms == 0 {
        errors.push(ValidationError::new("rate_limit.window_ms", "must be greater than 0"));
    }

    if let Some(name) = &config.rate_limit.client_ip_header {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                "rate_limit.client_ip_header",
                format!("'{name}' is not a valid header name"),
            ));
        }
    }

    match Url::parse(&config.upstream.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("upstream.url", e.to_string())),
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.connect_timeout_secs", "must be greater than 0"));
    }
    if config.upstream.response_timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.response_timeout_secs", "must be greater than 0"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("expected \"pretty\" or \"json\", got '{}'", config.observability.log_format),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "nope".into();
        config.rate_limit.max_requests = 0;
        config.upstream.url = "ftp://example.com".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["listener.bind_address", "rate_limit.max_requests", "upstream.url"]
        );
    }

    #[test]
    fn test_rejects_star_as_fixed_origin() {
        let mut config = ProxyConfig::default();
        config.cors.origin_policy = OriginPolicy::Fixed("*".into());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "cors.origin_policy");
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ProxyConfig::default();
        config.observability.metrics_address = "bad".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
