//! Drop tracks that are too short to estimate a velocity from.

use crate::TrackMap;

/// Keep tracks with at least `min_samples` samples.
pub fn filter_by_length(mut tracks: TrackMap, min_samples: usize) -> TrackMap {
    tracks.retain(|_, track| track.len() >= min_samples);
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::track;

    #[test]
    fn test_short_tracks_dropped() {
        let mut tracks = TrackMap::new();
        tracks.insert(1, track(1, &[(0.1, 0)]));
        tracks.insert(2, track(2, &[(0.1, 0), (0.2, 100)]));
        tracks.insert(3, track(3, &[]));

        let out = filter_by_length(tracks, 2);
        assert_eq!(out.keys().copied().collect::<Vec<_>>(), vec![2]);
    }
}
