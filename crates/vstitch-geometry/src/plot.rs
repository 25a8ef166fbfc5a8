//! Camera field-of-view triangles in a local frame around an origin camera.

use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use tracing::debug;
use vstitch_models::angle::normalize_angle;
use vstitch_models::{Camera, CameraPlot, Vector2};

use crate::enu::enu_offset;
use crate::half_plane::ensure_ccw;
use crate::matrix::Rotation;

/// Rotation that turns `origin`'s heading to face straight up (+y).
pub fn offset_rotation(origin: &Camera) -> f64 {
    normalize_angle(FRAC_PI_2 - origin.heading)
}

/// Plot one camera relative to `origin`.
///
/// Returns `None` when the camera's heading or FOV is not a number.
pub fn plot_camera(origin: &Camera, camera: &Camera) -> Option<CameraPlot> {
    if !camera.heading.is_finite() || !camera.fov.is_finite() || !origin.heading.is_finite() {
        debug!(camera_id = %camera.id, "Skipping camera without a usable heading");
        return None;
    }

    let offset = enu_offset(origin.location, camera.location);
    let half_fov = camera.fov / 2.0;
    let side = camera.view_distance / half_fov.cos();

    let left = camera.heading + half_fov;
    let right = camera.heading - half_fov;
    let triangle = [
        Vector2::new(left.cos(), left.sin()) * side + offset,
        offset,
        Vector2::new(right.cos(), right.sin()) * side + offset,
    ];

    let offset_rotation = offset_rotation(origin);
    let rotation = Rotation::new(offset_rotation);
    let vertices = ensure_ccw(triangle.map(|v| rotation.apply(v)));

    Some(CameraPlot {
        camera_id: camera.id.clone(),
        vertices,
        rotation: offset_rotation + camera.heading,
        position: rotation.apply(offset),
    })
}

/// Plot every camera except `origin`, skipping unusable headings.
pub fn plot_cameras(origin: &Camera, cameras: &[Arc<Camera>]) -> Vec<CameraPlot> {
    cameras
        .iter()
        .filter(|c| c.id != origin.id)
        .filter_map(|c| plot_camera(origin, c))
        .collect()
}
