//! Candidate cameras for the next appearance of a person leaving a view.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;
use vstitch_models::{Camera, CameraPlot, Vector2};

use crate::canvas::canvas_span;
use crate::capture_net::{rotation_for_velocity, CaptureNet, CaptureNetScreen};
use crate::error::GeometryResult;
use crate::plot::plot_cameras;
use crate::raster::{Grid, Screen};

/// Rasterizer configuration.
#[derive(Debug, Clone)]
pub struct RasterConfig {
    /// Grid density
    pub pixels_per_meter: f64,
    /// Width in metres of the capture net's far edge
    pub capture_radius_meters: f64,
    /// Upper bound on pixels per side; density is reduced to fit
    pub max_screen_size: usize,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            pixels_per_meter: 10.0,
            capture_radius_meters: 300.0,
            max_screen_size: 4096,
        }
    }
}

impl RasterConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            pixels_per_meter: std::env::var("PIXELS_PER_METER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.pixels_per_meter),
            capture_radius_meters: std::env::var("CAPTURE_RADIUS_METERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.capture_radius_meters),
            max_screen_size: std::env::var("MAX_SCREEN_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_screen_size),
        }
    }
}

/// Outcome of a capture-net search around one exit.
#[derive(Debug, Clone)]
pub struct CandidateSearch {
    /// Cameras whose view intersects the net, in directory order
    pub cameras: Vec<Arc<Camera>>,
    pub plots: Vec<CameraPlot>,
    /// `None` when no other camera could be plotted
    pub screen: Option<Screen>,
    pub net_screen: Option<CaptureNetScreen>,
}

impl CandidateSearch {
    fn empty() -> Self {
        Self {
            cameras: Vec::new(),
            plots: Vec::new(),
            screen: None,
            net_screen: None,
        }
    }
}

/// Find the cameras a person leaving `origin` with `exit_velocity` could
/// plausibly walk into next.
///
/// `exit_velocity` is in image space (normalized units per ms); it is
/// bucketed to a compass direction here. A zero velocity is an error.
pub fn candidate_cameras(
    origin: &Camera,
    cameras: &[Arc<Camera>],
    exit_velocity: Vector2,
    config: &RasterConfig,
) -> GeometryResult<CandidateSearch> {
    let direction = exit_velocity.bucket_velocity(0.0);
    rotation_for_velocity(direction)?;

    let plots = plot_cameras(origin, cameras);
    let Some(span) = canvas_span(&plots) else {
        debug!(camera_id = %origin.id, "No neighbouring cameras to search");
        return Ok(CandidateSearch::empty());
    };

    let grid = Grid::capped(config.pixels_per_meter, span, config.max_screen_size)?;
    let screen = Screen::rasterize(&plots, grid);

    let net = CaptureNet::new(config.capture_radius_meters, span)
        .rotated_toward(direction)?
        .translated(Vector2::new(grid.offset, grid.offset));
    let net_screen = CaptureNetScreen::rasterize(&net, grid);

    let hits: BTreeSet<usize> = net_screen
        .covered()
        .flat_map(|pixel| screen.indices_at_pixel(pixel).iter().copied())
        .collect();
    let hit_ids: BTreeSet<&str> = hits.iter().map(|&i| plots[i].camera_id.as_str()).collect();

    let candidates: Vec<Arc<Camera>> = cameras
        .iter()
        .filter(|c| hit_ids.contains(c.id.as_str()))
        .cloned()
        .collect();

    debug!(
        camera_id = %origin.id,
        candidates = candidates.len(),
        screen_size = grid.screen_size,
        "Capture net search complete"
    );

    Ok(CandidateSearch {
        cameras: candidates,
        plots,
        screen: Some(screen),
        net_screen: Some(net_screen),
    })
}
