//! Keep tracks whose relevant end sits near a frame boundary.

use vstitch_models::{Track, Vector2};

use crate::config::Direction;
use crate::TrackMap;

/// True when `p` lies outside `[threshold, 1 - threshold]` on either axis.
pub fn near_edge(p: Vector2, threshold: f64) -> bool {
    p.x < threshold || p.x > 1.0 - threshold || p.y < threshold || p.y > 1.0 - threshold
}

/// Exit: the last sample is near an edge. Enter: the first sample is off
/// the `threshold` midline (with the default 0.5, anywhere but dead centre).
pub fn is_edge_track(track: &Track, direction: Direction, threshold: f64) -> bool {
    let sample = match direction {
        Direction::Exit => track.last(),
        Direction::Enter => track.first(),
    };
    sample.is_some_and(|s| near_edge(s.position, threshold))
}

pub fn filter_edge_tracks(mut tracks: TrackMap, direction: Direction, threshold: f64) -> TrackMap {
    tracks.retain(|_, track| is_edge_track(track, direction, threshold));
    tracks
}
