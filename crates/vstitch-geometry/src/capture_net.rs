//! Directional trapezoid cast from an exit point along its velocity.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use vstitch_models::{GridCell, GridSnapshot, Vector2};

use crate::error::{GeometryError, GeometryResult};
use crate::half_plane::ensure_ccw;
use crate::matrix::Rotation;
use crate::raster::Grid;

/// Capture-net trapezoid, vertices counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureNet {
    pub vertices: [Vector2; 4],
}

impl CaptureNet {
    /// Unrotated net pointing east from the origin.
    ///
    /// One metre wide at the origin, widening to `capture_radius` metres at
    /// `x = meter_span` so it always reaches the canvas edge.
    pub fn new(capture_radius: f64, meter_span: f64) -> Self {
        let spread = (capture_radius - 1.0) / 2.0;
        Self {
            vertices: ensure_ccw([
                Vector2::new(meter_span, -0.5 - spread),
                Vector2::new(meter_span, 0.5 + spread),
                Vector2::new(0.0, 0.5),
                Vector2::new(0.0, -0.5),
            ]),
        }
    }

    /// Point the net along a bucketed image-space velocity.
    pub fn rotated_toward(self, bucketed_velocity: Vector2) -> GeometryResult<Self> {
        let Some(theta) = rotation_for_velocity(bucketed_velocity)? else {
            return Ok(self);
        };
        let rotation = Rotation::new(theta);
        Ok(Self {
            vertices: self.vertices.map(|v| rotation.apply(v)),
        })
    }

    pub fn translated(self, by: Vector2) -> Self {
        Self {
            vertices: self.vertices.map(|v| v + by),
        }
    }
}

/// Rotation for one of the 8 compass directions.
///
/// Image y grows downward, so `(1, 1)` points south-east. `Ok(None)` means
/// east, which needs no rotation.
pub fn rotation_for_velocity(v: Vector2) -> GeometryResult<Option<f64>> {
    let key = (v.x as i8, v.y as i8);
    if v.x != key.0 as f64 || v.y != key.1 as f64 {
        return Err(GeometryError::UnnormalizedVelocity { x: v.x, y: v.y });
    }

    match key {
        (0, 0) => Err(GeometryError::ZeroVelocity),
        (1, 0) => Ok(None),
        (1, 1) => Ok(Some(-FRAC_PI_4)),
        (1, -1) => Ok(Some(FRAC_PI_4)),
        (-1, 0) => Ok(Some(PI)),
        (-1, 1) => Ok(Some(-3.0 * FRAC_PI_4)),
        (-1, -1) => Ok(Some(-5.0 * FRAC_PI_4)),
        (0, 1) => Ok(Some(-FRAC_PI_2)),
        (0, -1) => Ok(Some(FRAC_PI_2)),
        _ => Err(GeometryError::UnnormalizedVelocity { x: v.x, y: v.y }),
    }
}

/// Boolean coverage grid of a capture net.
#[derive(Debug, Clone)]
pub struct CaptureNetScreen {
    grid: Grid,
    cells: Vec<bool>,
}

impl CaptureNetScreen {
    /// Rasterize a net already translated into grid metres.
    pub fn rasterize(net: &CaptureNet, grid: Grid) -> Self {
        let mut cells = vec![false; grid.pixel_count()];
        grid.for_each_inside(&net.vertices, |pixel| cells[pixel] = true);
        Self { grid, cells }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_covered(&self, row: usize, col: usize) -> bool {
        row < self.grid.screen_size
            && col < self.grid.screen_size
            && self.cells[self.grid.index(row, col)]
    }

    /// Covered pixel indices, row-major.
    pub fn covered(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, &hit)| hit.then_some(i))
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            screen_size: self.grid.screen_size,
            pixel_size: self.grid.pixel_size,
            meter_span: self.grid.meter_span,
            cells: self
                .covered()
                .map(|pixel| {
                    let (row, col) = self.grid.row_col(pixel);
                    GridCell {
                        row,
                        col,
                        cameras: Vec::new(),
                    }
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_east_is_identity() {
        let net = CaptureNet::new(300.0, 80.0);
        let rotated = net.rotated_toward(Vector2::new(1.0, 0.0)).unwrap();
        assert_eq!(rotated, net);
    }

    #[test]
    fn test_net_shape() {
        let net = CaptureNet::new(3.0, 10.0);
        assert_eq!(
            net.vertices,
            [
                Vector2::new(10.0, -1.5),
                Vector2::new(10.0, 1.5),
                Vector2::new(0.0, 0.5),
                Vector2::new(0.0, -0.5),
            ]
        );
    }

    #[test]
    fn test_zero_velocity_is_error() {
        let net = CaptureNet::new(300.0, 80.0);
        assert_eq!(
            net.rotated_toward(Vector2::ZERO),
            Err(GeometryError::ZeroVelocity)
        );
    }

    #[test]
    fn test_unbucketed_velocity_is_error() {
        assert!(matches!(
            rotation_for_velocity(Vector2::new(0.3, 0.0)),
            Err(GeometryError::UnnormalizedVelocity { .. })
        ));
        assert!(matches!(
            rotation_for_velocity(Vector2::new(2.0, 0.0)),
            Err(GeometryError::UnnormalizedVelocity { .. })
        ));
    }

    #[test]
    fn test_south_points_down() {
        // Image-down velocity sends the net toward -y.
        let net = CaptureNet::new(3.0, 10.0)
            .rotated_toward(Vector2::new(0.0, 1.0))
            .unwrap();
        let far = (net.vertices[0] + net.vertices[1]) / 2.0;
        assert!(far.x.abs() < 1e-9);
        assert!((far.y + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rasterize_translated_net() {
        let span = 20.0;
        let grid = Grid::new(1.0, span).unwrap();
        let net = CaptureNet::new(5.0, span).translated(Vector2::new(grid.offset, grid.offset));
        let screen = CaptureNetScreen::rasterize(&net, grid);

        // Row 10 is the centre line; the net runs from column 10 eastward.
        assert!(screen.is_covered(10, 15));
        assert!(!screen.is_covered(10, 5));
        assert!(!screen.is_covered(0, 15));
        assert!(!screen.is_covered(99, 99));
        assert_eq!(screen.snapshot().cells.len(), screen.covered().count());
    }
}
