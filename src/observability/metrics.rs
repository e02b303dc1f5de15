//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): routed requests by backend and class
//! - `router_upstream_duration_seconds` (histogram): outbound call latency by backend
//! - `router_breaker_failures_total` (counter): failures reported by backend and reason
//! - `router_circuit_open` (gauge): 1 while a backend's circuit is open, 0 otherwise, by pool index and address
//! - `router_pool_exhausted_total` (counter): requests rejected because every circuit was open
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::dispatch::{FailureReason, RouteClass};
use crate::resilience::CircuitState;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(backend: &str, class: RouteClass, elapsed: Duration) {
    counter!(
        "router_requests_total",
        "backend" => backend.to_string(),
        "class" => class.as_str()
    )
    .increment(1);
    histogram!("router_upstream_duration_seconds", "backend" => backend.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_breaker_failure(backend: &str, reason: FailureReason) {
    counter!(
        "router_breaker_failures_total",
        "backend" => backend.to_string(),
        "reason" => reason.as_str()
    )
    .increment(1);
}

pub fn record_circuit_state(index: usize, backend: &str, state: CircuitState) {
    let value = match state {
        CircuitState::Open => 1.0,
        CircuitState::Closed => 0.0,
    };
    gauge!(
        "router_circuit_open",
        "index" => index.to_string(),
        "backend" => backend.to_string()
    )
    .set(value);
}

pub fn record_pool_exhausted() {
    counter!("router_pool_exhausted_total").increment(1);
}
