//! Control headers and the pass-header allow-list.
//!
//! Only headers named in the allow-list reach the destination. Everything
//! else, including the `toll-*` control headers unless explicitly listed, is
//! dropped.

use std::borrow::Cow;

use axum::http::{HeaderMap, HeaderName};

use crate::config::{DestinationPolicy, NameSet, ProxySnapshot};

/// Destination host for the request. Required, exactly once.
pub const DESTINATION_HOST: HeaderName = HeaderName::from_static("toll-proxed-destination-host");

/// Single header name replacing the configured allow-list (open policy only).
pub const ALLOWED_HEADERS: HeaderName = HeaderName::from_static("toll-allowed-headers");

/// Presence requests full logging of the upstream response.
pub const FULL_LOG: HeaderName = HeaderName::from_static("toll-full-log");

/// Pick the set of header names that may be forwarded for this request.
pub fn resolve_allowed_headers<'a>(
    headers: &HeaderMap,
    snapshot: &'a ProxySnapshot,
) -> Cow<'a, NameSet> {
    if snapshot.policy() == DestinationPolicy::Open {
        if let Some(value) = headers.get(&ALLOWED_HEADERS) {
            let name = value.to_str().unwrap_or_default();
            return Cow::Owned(std::iter::once(name).collect::<NameSet>());
        }
    }
    Cow::Borrowed(&snapshot.pass_headers)
}

/// Copy every allowed header, keeping all values of repeated names in order.
pub fn filter_headers(inbound: &HeaderMap, allowed: &NameSet) -> HeaderMap {
    let mut outbound = HeaderMap::new();
    for (name, value) in inbound {
        if allowed.contains(name.as_str()) {
            outbound.append(name.clone(), value.clone());
        }
    }
    outbound
}

pub fn wants_full_log(headers: &HeaderMap) -> bool {
    headers.contains_key(&FULL_LOG)
}
