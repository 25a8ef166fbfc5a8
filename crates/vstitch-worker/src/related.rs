//! Candidate continuations of each exit on neighbouring cameras.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, warn};
use vstitch_geometry::{candidate_cameras, CandidateSearch, RasterConfig};
use vstitch_models::{Camera, EnterEvent, Event, ExitEvent, PlotMessage};
use vstitch_telemetry::FootageSource;
use vstitch_tracking::{enter_events, isolate, Direction, IsolationConfig};

use crate::config::RelatedConfig;
use crate::error::WorkerResult;
use crate::metrics;
use crate::publisher::PlotPublisher;

/// Everything the related-event search needs besides the footage source.
#[derive(Debug, Clone, Copy)]
pub struct RelatedSearch<'a> {
    pub cameras: &'a [Arc<Camera>],
    pub related: &'a RelatedConfig,
    pub isolation: &'a IsolationConfig,
    pub raster: &'a RasterConfig,
}

/// Attach candidate enter events to every exit.
///
/// An exit whose geometry cannot be searched is logged and dropped.
/// Upstream errors abort the whole call.
pub async fn attach_related<S>(
    source: &S,
    exits: Vec<ExitEvent>,
    search: RelatedSearch<'_>,
    publisher: Option<&PlotPublisher>,
) -> WorkerResult<Vec<ExitEvent>>
where
    S: FootageSource + ?Sized,
{
    let mut out = Vec::with_capacity(exits.len());

    for mut exit in exits {
        let (Some(origin), Some(last_ts)) = (
            exit.track.first().map(|o| Arc::clone(&o.camera)),
            exit.track.end_ms(),
        ) else {
            continue;
        };

        let found = match candidate_cameras(&origin, search.cameras, exit.velocity, search.raster) {
            Ok(found) => found,
            Err(e) => {
                warn!(
                    camera_id = %origin.id,
                    exit_id = exit.id,
                    error = %e,
                    "Skipping exit event with unusable geometry"
                );
                metrics::record_skipped_exit("geometry");
                continue;
            }
        };

        if let Some(publisher) = publisher {
            if let Some(message) = plot_cameras_message(&found) {
                publisher.send(message);
            }
        }

        let mut candidates = query_candidates(source, &found.cameras, last_ts, search).await?;
        candidates.sort_by_key(|e| (e.track.start_ms().unwrap_or(i64::MAX), e.id));

        debug!(
            camera_id = %origin.id,
            exit_id = exit.id,
            cameras = found.cameras.len(),
            candidates = candidates.len(),
            "Attached related events"
        );
        exit.related = candidates.into_iter().map(Event::from).collect();
        out.push(exit);
    }

    Ok(out)
}

/// Enter events on each candidate camera in the window after `last_ts`.
/// Results keep candidate-camera order regardless of completion order.
async fn query_candidates<S>(
    source: &S,
    cameras: &[Arc<Camera>],
    last_ts: i64,
    search: RelatedSearch<'_>,
) -> WorkerResult<Vec<EnterEvent>>
where
    S: FootageSource + ?Sized,
{
    let start_sec = last_ts.div_euclid(1000);
    let duration_sec = search.related.duration_secs;

    let queries: Vec<_> = cameras
        .iter()
        .map(|camera| {
            camera_enter_events(
                source,
                Arc::clone(camera),
                start_sec,
                duration_sec,
                search.isolation,
            )
        })
        .collect();
    let per_camera: Vec<Vec<EnterEvent>> = stream::iter(queries)
        .buffered(search.related.max_parallel_queries.max(1))
        .try_collect()
        .await?;

    Ok(per_camera.into_iter().flatten().collect())
}

async fn camera_enter_events<S>(
    source: &S,
    camera: Arc<Camera>,
    start_sec: i64,
    duration_sec: i64,
    isolation: &IsolationConfig,
) -> WorkerResult<Vec<EnterEvent>>
where
    S: FootageSource + ?Sized,
{
    let tracks = source.bounding_boxes(&camera, start_sec, duration_sec).await?;
    let events = enter_events(isolate(tracks, Direction::Enter, isolation));
    metrics::record_enter_events(&camera.id, events.len());
    Ok(events)
}

/// Dashboard view of a capture-net search, when anything was plotted.
pub fn plot_cameras_message(found: &CandidateSearch) -> Option<PlotMessage> {
    let (screen, net_screen) = (found.screen.as_ref()?, found.net_screen.as_ref()?);
    Some(PlotMessage::PlotCameras {
        cameras: found.plots.clone(),
        screen: screen.snapshot(),
        net_screen: net_screen.snapshot(),
    })
}
