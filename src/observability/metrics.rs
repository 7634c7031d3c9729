//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, destination
//! - `proxy_request_duration_seconds` (histogram): time until the response
//!   head is ready, by method and destination
//!
//! Rejected requests are recorded with destination `none`. Without an
//! installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, destination: &str, start: Instant) {
    ::metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "destination" => destination.to_string()
    )
    .increment(1);

    ::metrics::histogram!(
        "proxy_request_duration_seconds",
        "method" => method.to_string(),
        "destination" => destination.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
