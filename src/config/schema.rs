//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Forwarding policy: pass headers and destination hosts.
    pub proxy: ForwardingConfig,

    /// Outbound HTTPS client settings.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// How the destination host header is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DestinationPolicy {
    /// Destination must be a member of `allowed_destination_hosts`.
    #[default]
    AllowList,
    /// Any single destination is accepted and callers may override the
    /// pass-header set with `Toll-Allowed-Headers`.
    Open,
}

/// The `[proxy]` section.
///
/// Both lists are raw comma-separated strings; the derived sets are built
/// once per snapshot (see [`crate::config::ProxySnapshot`]).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Header names forwarded to the destination.
    #[serde(alias = "PassHeaders")]
    pub pass_headers: String,

    /// Destination hosts accepted under [`DestinationPolicy::AllowList`].
    #[serde(alias = "AllowedDestinationHosts")]
    pub allowed_destination_hosts: String,

    pub destination_policy: DestinationPolicy,
}

/// Outbound client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { connect_secs: 5 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: ProxyConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:5000");
        assert_eq!(config.proxy.destination_policy, DestinationPolicy::AllowList);
        assert_eq!(config.upstream.connect_secs, 5);
        assert!(config.proxy.pass_headers.is_empty());
    }

    #[test]
    fn accepts_pascal_case_option_names() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [proxy]
            PassHeaders = "Authorization"
            AllowedDestinationHosts = "api.example.com"
            destination_policy = "open"
            "#,
        )
        .unwrap();
        assert_eq!(config.proxy.pass_headers, "Authorization");
        assert_eq!(config.proxy.allowed_destination_hosts, "api.example.com");
        assert_eq!(config.proxy.destination_policy, DestinationPolicy::Open);
    }
}
