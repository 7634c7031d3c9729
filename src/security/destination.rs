//! Destination host resolution.
//!
//! The caller names the destination in `Toll-Proxed-Destination-Host`. The
//! header must appear exactly once. Under the allow-list policy the value must
//! also be a configured destination (case-insensitive); under the open policy
//! any single value is accepted verbatim.

use axum::http::HeaderMap;

use crate::config::{DestinationPolicy, ProxySnapshot};
use crate::error::ProxyError;
use crate::security::headers::DESTINATION_HOST;

/// Resolve the destination host for a request.
pub fn resolve_destination(
    headers: &HeaderMap,
    snapshot: &ProxySnapshot,
) -> Result<String, ProxyError> {
    let mut values = headers.get_all(&DESTINATION_HOST).iter();
    let value = values.next().ok_or(ProxyError::MissingDestination)?;
    if values.next().is_some() {
        return Err(ProxyError::InvalidDestination("header repeated"));
    }

    let host = value
        .to_str()
        .map_err(|_| ProxyError::InvalidDestination("not visible ASCII"))?;

    if snapshot.policy() == DestinationPolicy::AllowList
        && !snapshot.allowed_destination_hosts.contains(host)
    {
        return Err(ProxyError::InvalidDestination("host not allowed"));
    }

    Ok(host.to_string())
}
