//! Shared data models for cross-camera clip stitching.
//!
//! This crate provides Serde-serializable types for:
//! - Vectors and angle conversions
//! - Cameras and the hardware lookup table
//! - Observations, tracks and boundary events
//! - Resolved event chains
//! - Dashboard plot messages

pub mod angle;
pub mod camera;
pub mod connection;
pub mod event;
pub mod observation;
pub mod plot;
pub mod vector;

// Re-export common types
pub use camera::{Camera, GeoPoint, HardwareSpec};
pub use connection::{ConnectionType, ParseConnectionTypeError};
pub use event::{EnterEvent, Event, ExitEvent, FinalizedEvent};
pub use observation::{ObjectId, Observation, Track};
pub use plot::{CameraPlot, GridCell, GridSnapshot, PlotMessage, SubjectSuggestion};
pub use vector::Vector2;
