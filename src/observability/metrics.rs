//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ingress_requests_total` (counter): requests by method, status, backend
//! - `ingress_request_duration_seconds` (histogram): latency distribution
//! - `ingress_snapshots_applied_total` (counter): routing tables published
//! - `ingress_routes` / `ingress_certificates` (gauge): size of the current table
//! - `ingress_tls_handshakes_rejected_total` (counter): SNI misses
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its own HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, backend: &str, start: Instant) {
    counter!(
        "ingress_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);
    histogram!("ingress_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_snapshot_applied(rules: usize, certificates: usize) {
    counter!("ingress_snapshots_applied_total").increment(1);
    gauge!("ingress_routes").set(rules as f64);
    gauge!("ingress_certificates").set(certificates as f64);
}

pub fn record_tls_handshake_rejected() {
    counter!("ingress_tls_handshakes_rejected_total").increment(1);
}
