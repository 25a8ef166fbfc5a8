//! The footage service seam.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use vstitch_models::{Camera, ConnectionType, ObjectId, Track};

use crate::error::TelemetryResult;
use crate::types::MediaAccess;

/// Everything the pipelines read from the footage service.
///
/// Implemented over HTTP by [`crate::FootageClient`] and by in-memory
/// fakes in tests.
#[async_trait]
pub trait FootageSource: Send + Sync {
    /// Human detections on `camera` in `[start_sec, start_sec + duration_sec]`,
    /// grouped into one time-sorted track per object id.
    async fn bounding_boxes(
        &self,
        camera: &Arc<Camera>,
        start_sec: i64,
        duration_sec: i64,
    ) -> TelemetryResult<BTreeMap<ObjectId, Track>>;

    /// Every camera with a known location and heading.
    async fn cameras(&self) -> TelemetryResult<Vec<Arc<Camera>>>;

    /// VOD URI template for `camera_id` plus a session token valid for
    /// `token_duration_sec`.
    async fn media_uris(
        &self,
        camera_id: &str,
        connection: ConnectionType,
        token_duration_sec: u64,
    ) -> TelemetryResult<MediaAccess>;

    /// Download `[start_sec, end_sec]` of footage into `dest`, replacing it.
    /// Returns the number of bytes written.
    async fn download_vod(
        &self,
        access: &MediaAccess,
        connection: ConnectionType,
        start_sec: i64,
        end_sec: i64,
        dest: &Path,
    ) -> TelemetryResult<u64>;
}
