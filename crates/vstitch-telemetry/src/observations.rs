//! Convert raw detection boxes into per-object tracks.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;
use vstitch_models::{Camera, ObjectId, Observation, Track, Vector2};

use crate::types::RawBoundingBox;

/// Box edges are reported in permyriad of the frame.
const EDGE_SCALE: f64 = 10_000.0;

/// Normalized width or height below which a box is discarded.
pub const DEFAULT_MIN_BOX_SIZE: f64 = 0.02;

/// Centre and size of a box in normalized frame coordinates.
pub fn normalize_box(raw: &RawBoundingBox) -> (Vector2, Vector2) {
    let position = Vector2::new(
        (raw.r + raw.l) / 2.0 / EDGE_SCALE,
        (raw.b + raw.t) / 2.0 / EDGE_SCALE,
    );
    let size = Vector2::new((raw.r - raw.l) / EDGE_SCALE, (raw.b - raw.t) / EDGE_SCALE);
    (position, size)
}

/// Group human boxes into tracks keyed by object id, each sorted by time.
///
/// Boxes stamped before `start_sec` and boxes smaller than `min_box_size`
/// on either axis are dropped.
pub fn boxes_to_tracks(
    camera: &Arc<Camera>,
    boxes: Vec<RawBoundingBox>,
    start_sec: i64,
    min_box_size: f64,
) -> BTreeMap<ObjectId, Track> {
    let start_ms = start_sec * 1000;
    let mut grouped: BTreeMap<ObjectId, Vec<Observation>> = BTreeMap::new();
    let mut dropped = 0usize;

    for raw in boxes {
        if !raw.is_human() || raw.ts < start_ms {
            continue;
        }
        let (position, size) = normalize_box(&raw);
        if size.x < min_box_size || size.y < min_box_size {
            dropped += 1;
            continue;
        }
        grouped.entry(raw.object_id).or_default().push(Observation {
            object_id: raw.object_id,
            position,
            size,
            timestamp_ms: raw.ts,
            camera: Arc::clone(camera),
        });
    }

    if dropped > 0 {
        trace!(camera_id = %camera.id, dropped, "Dropped undersized boxes");
    }

    grouped
        .into_iter()
        .map(|(id, samples)| (id, Track::new(id, samples)))
        .collect()
}
