//! Immutable per-load view of the configuration.
//!
//! A [`ProxySnapshot`] is built once from a validated [`ProxyConfig`] and
//! carries the derived name sets precomputed, so request handling never
//! re-parses the raw strings.

use std::collections::HashSet;

use crate::config::schema::{DestinationPolicy, ProxyConfig};

/// Case-insensitive set of names parsed from a comma-separated list.
///
/// Entries are trimmed and empty entries dropped. Names are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameSet {
    names: HashSet<String>,
}

impl NameSet {
    /// Parse a comma-separated list such as `"Authorization, Accept"`.
    pub fn parse(raw: &str) -> Self {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<'a> FromIterator<&'a str> for NameSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(str::to_ascii_lowercase).collect(),
        }
    }
}

/// Configuration as seen by a single request.
#[derive(Debug, Clone)]
pub struct ProxySnapshot {
    pub config: ProxyConfig,
    pub pass_headers: NameSet,
    pub allowed_destination_hosts: NameSet,
}

impl ProxySnapshot {
    pub fn new(config: ProxyConfig) -> Self {
        let pass_headers = NameSet::parse(&config.proxy.pass_headers);
        let allowed_destination_hosts = NameSet::parse(&config.proxy.allowed_destination_hosts);
        Self {
            config,
            pass_headers,
            allowed_destination_hosts,
        }
    }

    pub fn policy(&self) -> DestinationPolicy {
        self.config.proxy.destination_policy
    }
}
