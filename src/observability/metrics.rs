//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): handled requests by outcome
//! - `relay_request_duration_seconds` (histogram): end-to-end latency
//! - `relay_upstream_duration_seconds` (histogram): outbound call latency
//! - `relay_upstream_status_total` (counter): origin status classes
//! - `relay_cache_events_total` (counter): hit / miss / store / invalidate
//! - `relay_cache_entries` (gauge): current cache size
//! - `relay_directives_total` (counter): applied in-band directives
//! - `relay_faults_total` (counter): supervised handler faults
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests pay nothing when the exporter is disabled.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(outcome: &'static str, start: Instant) {
    counter!("relay_requests_total", "outcome" => outcome).increment(1);
    histogram!("relay_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream(status: u16, start: Instant) {
    let class = match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    };
    counter!("relay_upstream_status_total", "class" => class).increment(1);
    histogram!("relay_upstream_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_cache_event(event: &'static str) {
    counter!("relay_cache_events_total", "event" => event).increment(1);
}

pub fn record_cache_size(size: usize) {
    gauge!("relay_cache_entries").set(size as f64);
}

pub fn record_directive(directive: &'static str) {
    counter!("relay_directives_total", "directive" => directive).increment(1);
}

pub fn record_fault() {
    counter!("relay_faults_total").increment(1);
}
