//! Metrics collection and exposition.
//!
//! # Metrics
//! - `intake_requests_total` (counter): requests by channel, outcome
//! - `intake_decoder_matches_total` (counter): which payload encoding matched
//! - `intake_appends_total` (counter): rows appended, or failed appends
//! - `submit_attempts_total` (counter): client transport attempts by encoding, result

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(channel: &'static str, outcome: &'static str) {
    metrics::counter!("intake_requests_total", "channel" => channel, "outcome" => outcome)
        .increment(1);
}

pub fn record_decoder_match(decoder: &'static str) {
    metrics::counter!("intake_decoder_matches_total", "decoder" => decoder).increment(1);
}

pub fn record_append(ok: bool) {
    let result = if ok { "ok" } else { "error" };
    metrics::counter!("intake_appends_total", "result" => result).increment(1);
}

pub fn record_submit_attempt(encoding: &'static str, ok: bool) {
    let result = if ok { "dispatched" } else { "transport_error" };
    metrics::counter!("submit_attempts_total", "encoding" => encoding, "result" => result)
        .increment(1);
}
