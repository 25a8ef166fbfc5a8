//! Per-frame detections and the tracks built from them.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::vector::Vector2;

/// Upstream object id. Not stable across brief occlusions.
pub type ObjectId = i64;

/// One detected person in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub object_id: ObjectId,
    /// Normalized box centre
    pub position: Vector2,
    /// Normalized box width/height
    pub size: Vector2,
    /// Milliseconds since the epoch
    pub timestamp_ms: i64,
    pub camera: Arc<Camera>,
}

impl Observation {
    /// Velocity in normalized units per millisecond from `self` to `other`.
    ///
    /// Order-independent: swapping the arguments flips both deltas.
    pub fn velocity_to(&self, other: &Observation) -> Vector2 {
        let dt = (other.timestamp_ms - self.timestamp_ms) as f64;
        (other.position - self.position) / dt
    }

    /// Same frame, same camera, same box.
    pub fn is_same_sample(&self, other: &Observation) -> bool {
        self.timestamp_ms == other.timestamp_ms
            && self.camera.id == other.camera.id
            && self.size == other.size
            && self.position == other.position
    }

    pub fn camera_id(&self) -> &str {
        &self.camera.id
    }
}

/// Time-ordered samples believed to be one continuous traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: ObjectId,
    pub samples: Vec<Observation>,
}

impl Track {
    /// Create a track, sorting samples by timestamp.
    pub fn new(id: ObjectId, mut samples: Vec<Observation>) -> Self {
        samples.sort_by_key(|s| s.timestamp_ms);
        Self { id, samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.samples.last()
    }

    pub fn start_ms(&self) -> Option<i64> {
        self.first().map(|s| s.timestamp_ms)
    }

    pub fn end_ms(&self) -> Option<i64> {
        self.last().map(|s| s.timestamp_ms)
    }

    /// Move every sample of `other` into this track and re-sort.
    pub fn absorb(&mut self, other: Track) {
        self.samples.extend(other.samples);
        self.samples.sort_by_key(|s| s.timestamp_ms);
    }

    /// True if any sample was reported under `object_id`.
    pub fn contains_object(&self, object_id: ObjectId) -> bool {
        self.samples.iter().any(|s| s.object_id == object_id)
    }

    /// Velocities between consecutive samples, earliest first.
    pub fn step_velocities(&self) -> Vec<Vector2> {
        self.samples
            .windows(2)
            .map(|w| w[0].velocity_to(&w[1]))
            .collect()
    }
}
