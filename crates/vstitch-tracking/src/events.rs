//! Turn isolated tracks into boundary events.

use vstitch_models::{EnterEvent, ExitEvent};

use crate::config::{Direction, IsolationConfig};
use crate::velocity::{isolate_velocities, IsolatedTrack};
use crate::{collation, edge, length, segmentation, TrackMap};

/// Run every isolation stage in order:
/// collation, segmentation, length, edge, length, velocity.
pub fn isolate(tracks: TrackMap, direction: Direction, config: &IsolationConfig) -> Vec<IsolatedTrack> {
    let tracks = collation::collate(tracks, &config.collation);
    let tracks = segmentation::segment_all(tracks, config.max_gap_ms(direction), direction);
    let tracks = length::filter_by_length(tracks, config.min_samples);
    let tracks = edge::filter_edge_tracks(tracks, direction, config.edge_threshold(direction));
    let tracks = length::filter_by_length(tracks, config.min_samples);
    isolate_velocities(tracks, direction, config)
}

fn sort_key(iso: &IsolatedTrack) -> (i64, i64) {
    (iso.track.start_ms().unwrap_or(i64::MAX), iso.track.id)
}

/// Exit events ordered by first-sample time, ties broken by id.
pub fn exit_events(mut isolated: Vec<IsolatedTrack>) -> Vec<ExitEvent> {
    isolated.sort_by_key(sort_key);
    isolated
        .into_iter()
        .map(|iso| ExitEvent::new(iso.track.id, iso.track, iso.velocity))
        .collect()
}

/// Enter events ordered by first-sample time, ties broken by id.
pub fn enter_events(mut isolated: Vec<IsolatedTrack>) -> Vec<EnterEvent> {
    isolated.sort_by_key(sort_key);
    isolated
        .into_iter()
        .map(|iso| EnterEvent {
            id: iso.track.id,
            track: iso.track,
            velocity: iso.velocity,
        })
        .collect()
}
