//! Build the camera directory from upstream camera states.

use std::sync::Arc;

use tracing::debug;
use vstitch_models::{Camera, GeoPoint};

use crate::types::CameraState;

/// Cameras with a full position and heading. Others are skipped.
pub fn cameras_from_states(states: Vec<CameraState>) -> Vec<Arc<Camera>> {
    let total = states.len();
    let cameras: Vec<Arc<Camera>> = states
        .into_iter()
        .filter_map(|state| {
            let (Some(lat), Some(lon), Some(direction)) =
                (state.latitude, state.longitude, state.direction_radians)
            else {
                return None;
            };
            Some(Arc::new(Camera::from_upstream(
                state.uuid,
                direction,
                GeoPoint::new(lat, lon),
                state.hw_variation.as_deref(),
            )))
        })
        .collect();

    if cameras.len() < total {
        debug!(
            skipped = total - cameras.len(),
            kept = cameras.len(),
            "Skipped cameras without a location or heading"
        );
    }
    cameras
}
