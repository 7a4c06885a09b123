//! Metrics exposition.
//!
//! # Metrics
//! - `proxy_upstream_attempts_total` (counter): outbound attempts by outcome
//! - `proxy_requests_total` (counter): proxy requests by outcome
//! - `proxy_relays_total` (counter): relays by how they ended
//!
//! Counters are recorded with the `metrics` macros wherever the event
//! happens; without an installed recorder they are no-ops.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("invalid metrics address '{0}': {1}")]
    Address(String, #[source] std::net::AddrParseError),

    #[error("failed to install Prometheus exporter: {0}")]
    Install(#[from] BuildError),
}

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), MetricsError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}
