//! Upstream request metrics.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Upstream requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "vstitch_upstream_requests_total";

    /// Retry attempts by operation.
    pub const RETRIES_TOTAL: &str = "vstitch_upstream_retries_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "vstitch_upstream_latency_seconds";

    /// Video segments written to disk.
    pub const SEGMENTS_TOTAL: &str = "vstitch_vod_segments_total";

    /// Bytes of video written to disk.
    pub const VOD_BYTES_TOTAL: &str = "vstitch_vod_bytes_total";
}

/// Record metrics for a completed upstream request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a retry attempt.
pub fn record_retry(operation: &str) {
    counter!(
        names::RETRIES_TOTAL,
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Record one downloaded VOD segment.
pub fn record_segment(bytes: usize) {
    counter!(names::SEGMENTS_TOTAL).increment(1);
    counter!(names::VOD_BYTES_TOTAL).increment(bytes as u64);
}
