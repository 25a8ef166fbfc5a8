//! Worker error types.

use std::path::PathBuf;

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Camera not found: {0}")]
    CameraNotFound(String),

    #[error("Invalid chain: {0}")]
    InvalidChain(String),

    #[error("Concatenation failed after {attempts} attempts in {}", dir.display())]
    ConcatExhausted { attempts: u32, dir: PathBuf },

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] vstitch_telemetry::TelemetryError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] vstitch_geometry::GeometryError),

    #[error("Media error: {0}")]
    Media(#[from] vstitch_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn camera_not_found(id: impl Into<String>) -> Self {
        Self::CameraNotFound(id.into())
    }

    pub fn invalid_chain(msg: impl Into<String>) -> Self {
        Self::InvalidChain(msg.into())
    }

    /// Check if the next poll may succeed where this one failed.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkerError::Telemetry(e) => e.is_retryable(),
            WorkerError::Io(_) => true,
            _ => false,
        }
    }
}
