//! Pipeline outcome metrics.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::{WorkerError, WorkerResult};

/// Metric name constants for consistency.
pub mod names {
    pub const EXIT_EVENTS_TOTAL: &str = "vstitch_exit_events_total";
    pub const ENTER_EVENTS_TOTAL: &str = "vstitch_enter_events_total";
    pub const CHAINS_TOTAL: &str = "vstitch_chains_total";
    pub const CLIPS_TOTAL: &str = "vstitch_clips_total";
    pub const CONCAT_RETRIES_TOTAL: &str = "vstitch_concat_retries_total";
    pub const SKIPPED_EXITS_TOTAL: &str = "vstitch_skipped_exit_events_total";
}

/// Serve Prometheus metrics on `0.0.0.0:<port>`. Must run inside the runtime.
pub fn install_exporter(port: u16) -> WorkerResult<()> {
    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from(([0, 0, 0, 0], port)))
        .install()
        .map_err(|e| WorkerError::config_error(format!("metrics exporter: {}", e)))
}

pub fn record_exit_events(camera_id: &str, count: usize) {
    counter!(names::EXIT_EVENTS_TOTAL, "camera" => camera_id.to_string()).increment(count as u64);
}

pub fn record_enter_events(camera_id: &str, count: usize) {
    counter!(names::ENTER_EVENTS_TOTAL, "camera" => camera_id.to_string()).increment(count as u64);
}

pub fn record_chains(count: usize) {
    counter!(names::CHAINS_TOTAL).increment(count as u64);
}

/// `outcome` is one of `stitched`, `skipped`, `failed`.
pub fn record_clip(outcome: &'static str) {
    counter!(names::CLIPS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_concat_retry() {
    counter!(names::CONCAT_RETRIES_TOTAL).increment(1);
}

pub fn record_skipped_exit(reason: &'static str) {
    counter!(names::SKIPPED_EXITS_TOTAL, "reason" => reason).increment(1);
}
