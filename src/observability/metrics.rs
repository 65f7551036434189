//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_dispatch_total` (counter): decisions by variant
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_uploads_total` (counter): document saves by kind and outcome
//! - `gateway_orphaned_blobs_total` (counter): blobs left behind by a failed save
//! - `gateway_config_reloads_total` (counter): reloads by result
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed (tests stay quiet)
//! - Labels are low-cardinality (no paths, no hosts)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::RoutingDecision;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(decision: RoutingDecision) {
    counter!("gateway_dispatch_total", "decision" => decision.as_str()).increment(1);
}

pub fn record_request(method: &str, status: u16, route: &'static str, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route,
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upload(kind: &'static str, outcome: &'static str) {
    counter!("gateway_uploads_total", "kind" => kind, "outcome" => outcome).increment(1);
}

pub fn record_orphaned_blob() {
    counter!("gateway_orphaned_blobs_total").increment(1);
}

pub fn record_config_reload(success: bool) {
    let result = if success { "applied" } else { "rejected" };
    counter!("gateway_config_reloads_total", "result" => result).increment(1);
}
