//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): completed requests by class, status
//! - `dispatch_request_duration_seconds` (histogram): latency by class
//! - `dispatch_rejected_total` (counter): rejections by class, reason
//! - `dispatch_pool_queued` / `dispatch_pool_in_flight` (gauges): pool load
//!
//! # Design Decisions
//! - Metric updates are atomic increments, cheap enough for the dispatch path
//! - The Prometheus endpoint runs on its own address, off the request port

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record a completed request.
pub fn record_dispatch(class: &str, status: u16, start: Instant) {
    counter!(
        "dispatch_requests_total",
        "class" => class.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "dispatch_request_duration_seconds",
        "class" => class.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a request rejected before admission.
pub fn record_rejected(class: &str, reason: &str) {
    counter!(
        "dispatch_rejected_total",
        "class" => class.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Publish current worker pool load.
pub fn record_pool_gauges(queued: usize, in_flight: usize) {
    gauge!("dispatch_pool_queued").set(queued as f64);
    gauge!("dispatch_pool_in_flight").set(in_flight as f64);
}
