//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_contact_submissions_total` (counter): by outcome
//! - `gateway_notifications_total` (counter): by outcome
//! - `gateway_payments_total` (counter): by outcome
//! - `gateway_sink_failures_total` (counter): telemetry deliveries
//!   dropped, by sink

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "failed to start metrics endpoint"),
    }
}

pub fn record_contact_submission(outcome: &str) {
    counter!("gateway_contact_submissions_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn record_notification(outcome: &str) {
    counter!("gateway_notifications_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn record_payment(outcome: &str) {
    counter!("gateway_payments_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn record_sink_failure(sink: &str) {
    counter!("gateway_sink_failures_total", "sink" => sink.to_string()).increment(1);
}
