//! Exit-event detection on the subject's camera.

use std::sync::Arc;

use tracing::{debug, info};
use vstitch_models::{Camera, ExitEvent, ObjectId};
use vstitch_telemetry::FootageSource;
use vstitch_tracking::{exit_events, isolate, Direction, IsolationConfig};

use crate::config::DetectionConfig;
use crate::error::WorkerResult;
use crate::metrics;

/// Find the exits from `camera` in the window ending `offset` before
/// `anchor_ms`, optionally keeping only those that contain `subject`.
///
/// Events are ordered by first-sample time, ties broken by id.
pub async fn detect_exit_events<S>(
    source: &S,
    camera: &Arc<Camera>,
    subject: Option<ObjectId>,
    anchor_ms: i64,
    detection: &DetectionConfig,
    isolation: &IsolationConfig,
) -> WorkerResult<Vec<ExitEvent>>
where
    S: FootageSource + ?Sized,
{
    let (start_sec, end_sec) = detection.window(anchor_ms);
    let tracks = source
        .bounding_boxes(camera, start_sec, end_sec - start_sec)
        .await?;
    let track_count = tracks.len();

    let mut events = exit_events(isolate(tracks, Direction::Exit, isolation));
    debug!(
        camera_id = %camera.id,
        tracks = track_count,
        exits = events.len(),
        "Isolated exit events"
    );

    if let Some(id) = subject {
        events.retain(|e| e.track.contains_object(id));
    }

    info!(
        camera_id = %camera.id,
        start_sec,
        end_sec,
        subject = ?subject,
        exits = events.len(),
        "Exit detection complete"
    );
    metrics::record_exit_events(&camera.id, events.len());

    Ok(events)
}
