//! Error types for handoff geometry.

use thiserror::Error;

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Errors raised by the capture-net and rasterizer.
///
/// These indicate a malformed exit event. Callers usually log and skip it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Cannot orient a capture net along a zero velocity")]
    ZeroVelocity,

    #[error("Velocity ({x}, {y}) is not bucketed to -1/0/1")]
    UnnormalizedVelocity { x: f64, y: f64 },

    #[error("Invalid raster resolution: {0}")]
    InvalidResolution(String),
}

impl GeometryError {
    pub fn invalid_resolution(msg: impl Into<String>) -> Self {
        Self::InvalidResolution(msg.into())
    }
}
