//! Rasterize camera plots onto a square pixel grid.

use std::collections::HashMap;
use std::ops::Range;

use tracing::warn;
use vstitch_models::{CameraPlot, GridCell, GridSnapshot, Vector2};

use crate::error::{GeometryError, GeometryResult};
use crate::half_plane::{bounds, contains};

/// Scale metadata shared by camera and capture-net screens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    /// Canvas side in metres
    pub meter_span: f64,
    /// Pixels per side
    pub screen_size: usize,
    /// Metres per pixel
    pub pixel_size: f64,
    /// Translation from origin-centred metres to grid metres
    pub offset: f64,
}

impl Grid {
    pub fn new(pixels_per_meter: f64, meter_span: f64) -> GeometryResult<Self> {
        if !(pixels_per_meter.is_finite() && pixels_per_meter > 0.0) {
            return Err(GeometryError::invalid_resolution(format!(
                "pixels per meter must be positive, got {}",
                pixels_per_meter
            )));
        }
        if !(meter_span.is_finite() && meter_span > 0.0) {
            return Err(GeometryError::invalid_resolution(format!(
                "canvas span must be positive, got {}",
                meter_span
            )));
        }

        Ok(Self {
            meter_span,
            screen_size: (pixels_per_meter * meter_span).ceil() as usize,
            pixel_size: 1.0 / pixels_per_meter,
            offset: meter_span / 2.0,
        })
    }

    /// Like [`Grid::new`], lowering the density if the grid would exceed
    /// `max_side` pixels per side.
    pub fn capped(pixels_per_meter: f64, meter_span: f64, max_side: usize) -> GeometryResult<Self> {
        let wanted = pixels_per_meter * meter_span;
        if max_side > 0 && wanted.is_finite() && wanted > max_side as f64 {
            let reduced = max_side as f64 / meter_span;
            warn!(
                meter_span,
                pixels_per_meter,
                reduced_pixels_per_meter = reduced,
                "Canvas too large for requested density, reducing resolution"
            );
            return Self::new(reduced, meter_span);
        }
        Self::new(pixels_per_meter, meter_span)
    }

    /// World position (grid metres) of a pixel centre.
    pub fn pixel_center(&self, row: usize, col: usize) -> Vector2 {
        Vector2::new(
            (col as f64 + 0.5) * self.pixel_size,
            (row as f64 + 0.5) * self.pixel_size,
        )
    }

    pub fn pixel_count(&self) -> usize {
        self.screen_size * self.screen_size
    }

    pub(crate) fn index(&self, row: usize, col: usize) -> usize {
        row * self.screen_size + col
    }

    pub(crate) fn row_col(&self, index: usize) -> (usize, usize) {
        (index / self.screen_size, index % self.screen_size)
    }

    /// Pixels whose centres can fall within `[min, max]` on one axis.
    pub(crate) fn pixel_range(&self, min: f64, max: f64) -> Range<usize> {
        let size = self.screen_size as f64;
        let lo = (min / self.pixel_size - 0.5).ceil().clamp(0.0, size);
        let hi = ((max / self.pixel_size - 0.5).floor() + 1.0).clamp(0.0, size);
        if lo.is_nan() || hi.is_nan() || lo >= hi {
            return 0..0;
        }
        lo as usize..hi as usize
    }

    /// Visit every pixel whose centre is inside a convex CCW polygon
    /// given in grid metres.
    pub(crate) fn for_each_inside(&self, polygon: &[Vector2], mut visit: impl FnMut(usize)) {
        let (min, max) = bounds(polygon);
        for row in self.pixel_range(min.y, max.y) {
            for col in self.pixel_range(min.x, max.x) {
                if contains(polygon, self.pixel_center(row, col)) {
                    visit(self.index(row, col));
                }
            }
        }
    }
}

/// Camera coverage grid. A pixel may be covered by several cameras.
#[derive(Debug, Clone)]
pub struct Screen {
    grid: Grid,
    camera_ids: Vec<String>,
    /// Pixel index -> indices into `camera_ids`. Uncovered pixels are absent.
    cells: HashMap<usize, Vec<usize>>,
}

impl Screen {
    /// Mark each pixel whose centre lies inside a camera's triangle.
    pub fn rasterize(plots: &[CameraPlot], grid: Grid) -> Self {
        let shift = Vector2::new(grid.offset, grid.offset);
        let mut cells: HashMap<usize, Vec<usize>> = HashMap::new();

        for (camera_index, plot) in plots.iter().enumerate() {
            let triangle = plot.vertices.map(|v| v + shift);
            grid.for_each_inside(&triangle, |pixel| {
                cells.entry(pixel).or_default().push(camera_index);
            });
        }

        Self {
            grid,
            camera_ids: plots.iter().map(|p| p.camera_id.clone()).collect(),
            cells,
        }
    }

    pub(crate) fn indices_at_pixel(&self, pixel: usize) -> &[usize] {
        self.cells.get(&pixel).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn snapshot(&self) -> GridSnapshot {
        let mut pixels: Vec<&usize> = self.cells.keys().collect();
        pixels.sort_unstable();

        let cells = pixels
            .into_iter()
            .map(|&pixel| {
                let (row, col) = self.grid.row_col(pixel);
                GridCell {
                    row,
                    col,
                    cameras: self.cells[&pixel]
                        .iter()
                        .map(|&i| self.camera_ids[i].clone())
                        .collect(),
                }
            })
            .collect();

        GridSnapshot {
            screen_size: self.grid.screen_size,
            pixel_size: self.grid.pixel_size,
            meter_span: self.grid.meter_span,
            cells,
        }
    }
}
