//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics and reports every
//! problem found, not just the first.

use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::config::schema::ProxyConfig;
use crate::config::snapshot::NameSet;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),

    #[error("upstream.connect_secs must be greater than zero")]
    ConnectTimeout,

    #[error("proxy.pass_headers entry `{0}` is not a valid header name")]
    PassHeader(String),
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.upstream.connect_secs == 0 {
        errors.push(ValidationError::ConnectTimeout);
    }

    let mut invalid: Vec<String> = NameSet::parse(&config.proxy.pass_headers)
        .iter()
        .filter(|name| HeaderName::from_bytes(name.as_bytes()).is_err())
        .map(str::to_string)
        .collect();
    invalid.sort();
    errors.extend(invalid.into_iter().map(ValidationError::PassHeader));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
