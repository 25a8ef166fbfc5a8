//! Recent people a subject can be picked from.

use std::sync::Arc;

use tracing::{debug, warn};
use vstitch_models::{Camera, ConnectionType, SubjectSuggestion};
use vstitch_telemetry::FootageSource;
use vstitch_tracking::collation::collate;
use vstitch_tracking::length::filter_by_length;
use vstitch_tracking::IsolationConfig;

use crate::error::WorkerResult;

/// Frame thumbnail for `camera_id` at `timestamp_ms`, derived from a WAN
/// VOD template. `None` if the template has no `/dash` path.
pub fn thumbnail_url(wan_template: &str, camera_id: &str, timestamp_ms: i64) -> Option<String> {
    let base = &wan_template[..wan_template.find("/dash")?];
    Some(format!("{}/media/frame/{}/{}/thumb.jpeg", base, camera_id, timestamp_ms))
}

/// First sighting of every person seen on any camera in the last
/// `window_secs` before `now_ms`, oldest first.
pub async fn recent_subjects<S>(
    source: &S,
    cameras: &[Arc<Camera>],
    now_ms: i64,
    window_secs: i64,
    isolation: &IsolationConfig,
    token_duration_secs: u64,
) -> WorkerResult<Vec<SubjectSuggestion>>
where
    S: FootageSource + ?Sized,
{
    let start_sec = now_ms.div_euclid(1000) - window_secs;
    let mut subjects = Vec::new();

    for camera in cameras {
        let tracks = source.bounding_boxes(camera, start_sec, window_secs).await?;
        let tracks = filter_by_length(collate(tracks, &isolation.collation), isolation.min_samples);
        if tracks.is_empty() {
            continue;
        }

        // Thumbnails are cosmetic; a failed lookup still lists the person.
        let template = match source
            .media_uris(&camera.id, ConnectionType::Wan, token_duration_secs)
            .await
        {
            Ok(access) => Some(access.uri_template),
            Err(e) => {
                warn!(camera_id = %camera.id, error = %e, "No thumbnail template");
                None
            }
        };

        for track in tracks.values() {
            let Some(first) = track.first() else { continue };
            subjects.push(SubjectSuggestion {
                camera_id: camera.id.clone(),
                object_id: track.id,
                timestamp_ms: first.timestamp_ms,
                thumbnail_url: template
                    .as_deref()
                    .and_then(|t| thumbnail_url(t, &camera.id, first.timestamp_ms)),
            });
        }
    }

    subjects.sort_by_key(|s| (s.timestamp_ms, s.object_id));
    debug!(subjects = subjects.len(), "Collected recent subjects");
    Ok(subjects)
}
