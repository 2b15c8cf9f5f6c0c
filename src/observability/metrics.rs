//! Metrics collection and exposition.
//!
//! # Metrics
//! - `balancer_requests_total` (counter): dispatched requests by status, backend
//! - `balancer_request_duration_seconds` (histogram): dispatch latency
//! - `balancer_backend_health` (gauge): 1=healthy, 0=unhealthy
//! - `balancer_pool_discards_total` (counter): handles dropped because the pool was full
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16, backend: &str, start: Instant) {
    let labels = [
        ("status", status.to_string()),
        ("backend", backend.to_string()),
    ];
    ::metrics::counter!("balancer_requests_total", &labels).increment(1);
    ::metrics::histogram!("balancer_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_backend_health(backend: &str, healthy: bool) {
    ::metrics::gauge!("balancer_backend_health", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_pool_discard(backend: &str) {
    ::metrics::counter!("balancer_pool_discards_total", "backend" => backend.to_string())
        .increment(1);
}
