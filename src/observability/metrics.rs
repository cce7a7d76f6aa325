//! Metrics collection and exposition.
//!
//! # Metrics
//! - `playground_proxy_requests_total` (counter): finished requests by outcome
//! - `playground_proxy_upstream_duration_seconds` (histogram): time spent on
//!   requests that reached the network, by outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - Prometheus exporter is opt-in via config

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

pub const REQUESTS_TOTAL: &str = "playground_proxy_requests_total";
pub const UPSTREAM_DURATION: &str = "playground_proxy_upstream_duration_seconds";

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a finished request; `upstream` is set when the network was reached.
pub fn record_outcome(outcome: &'static str, upstream: Option<Duration>) {
    ::metrics::counter!(REQUESTS_TOTAL, "outcome" => outcome).increment(1);
    if let Some(elapsed) = upstream {
        ::metrics::histogram!(UPSTREAM_DURATION, "outcome" => outcome).record(elapsed.as_secs_f64());
    }
}
