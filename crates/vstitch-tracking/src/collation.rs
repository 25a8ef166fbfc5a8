//! Merge tracks that are fragments of one traversal.
//!
//! Upstream object ids change across brief occlusions. Each pass snapshots
//! the current ids, records merge decisions in a union-find, then applies
//! them in one step. Passes repeat until one performs no merge.

use tracing::debug;
use vstitch_models::{Observation, Track};

use crate::config::CollationConfig;
use crate::TrackMap;

/// Merge fragmented tracks to a fixed point.
///
/// The smallest id of each merged group survives. Running this again on
/// its own output performs no merges.
pub fn collate(mut tracks: TrackMap, config: &CollationConfig) -> TrackMap {
    let mut passes = 0;
    loop {
        let (next, merges) = collate_pass(tracks, config);
        tracks = next;
        passes += 1;
        if merges == 0 {
            break;
        }
        debug!(merges, pass = passes, "Collated track fragments");
    }
    tracks
}

/// One snapshot pass. Returns the new map and the number of fragments
/// folded into a survivor.
pub fn collate_pass(tracks: TrackMap, config: &CollationConfig) -> (TrackMap, usize) {
    let entries: Vec<Track> = tracks.into_values().collect();
    let mut groups = UnionFind::new(entries.len());

    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            if groups.find(i) != groups.find(j) && should_merge(&entries[i], &entries[j], config) {
                groups.union(i, j);
            }
        }
    }

    let roots: Vec<usize> = (0..entries.len()).map(|i| groups.find(i)).collect();
    let mut merged = TrackMap::new();
    let mut merges = 0;

    // Entries come out of the map in ascending id order, so each root is
    // the smallest id in its group and is visited before its members.
    let mut survivors: Vec<Option<Track>> = vec![None; entries.len()];
    for (i, track) in entries.into_iter().enumerate() {
        let root = roots[i];
        match survivors[root].as_mut() {
            Some(survivor) => {
                survivor.absorb(track);
                merges += 1;
            }
            None => survivors[root] = Some(track),
        }
    }

    for track in survivors.into_iter().flatten() {
        merged.insert(track.id, track);
    }

    (merged, merges)
}

/// True when some pair of samples, one from each track, looks like the
/// same person at nearly the same place and time.
pub fn should_merge(a: &Track, b: &Track, config: &CollationConfig) -> bool {
    if !time_ranges_touch(a, b, config.max_time_delta_ms) {
        return false;
    }

    a.samples
        .iter()
        .any(|sa| b.samples.iter().any(|sb| samples_link(sa, sb, config)))
}

fn time_ranges_touch(a: &Track, b: &Track, slack_ms: i64) -> bool {
    match (a.start_ms(), a.end_ms(), b.start_ms(), b.end_ms()) {
        (Some(a0), Some(a1), Some(b0), Some(b1)) => a0 - slack_ms < b1 && b0 - slack_ms < a1,
        _ => false,
    }
}

fn samples_link(a: &Observation, b: &Observation, config: &CollationConfig) -> bool {
    let size = (a.size - b.size).abs();
    if size.x >= config.size_tolerance || size.y >= config.size_tolerance {
        return false;
    }

    let dt = (b.timestamp_ms - a.timestamp_ms).abs();
    if dt >= config.max_time_delta_ms {
        return false;
    }

    if dt == 0 {
        (a.position - b.position).shorter_than(config.position_tolerance)
    } else {
        a.velocity_to(b).shorter_than(config.max_link_speed)
    }
}

/// Disjoint sets over snapshot indices. The smaller index is always the root.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[high] = low;
        }
    }
}
