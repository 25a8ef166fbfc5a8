//! Split tracks on long gaps.
//!
//! Bounds how far collation may bridge a real disappearance and
//! reappearance under the same id.

use vstitch_models::Track;

use crate::config::Direction;
use crate::TrackMap;

/// Keep the contiguous segment nearest the end of interest: the trailing
/// one for exits, the leading one for enters.
///
/// No two consecutive samples of the result are more than `max_gap_ms` apart.
pub fn segment(mut track: Track, max_gap_ms: i64, direction: Direction) -> Track {
    let mut gaps = track
        .samples
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[1].timestamp_ms - w[0].timestamp_ms > max_gap_ms)
        .map(|(i, _)| i + 1);

    let cut = match direction {
        Direction::Exit => gaps.last(),
        Direction::Enter => gaps.next(),
    };

    match (direction, cut) {
        (Direction::Exit, Some(cut)) => {
            track.samples.drain(..cut);
        }
        (Direction::Enter, Some(cut)) => track.samples.truncate(cut),
        (_, None) => {}
    }
    track
}

/// [`segment`] every track in the map.
pub fn segment_all(tracks: TrackMap, max_gap_ms: i64, direction: Direction) -> TrackMap {
    tracks
        .into_iter()
        .map(|(id, track)| (id, segment(track, max_gap_ms, direction)))
        .collect()
}
