//! Camera-handoff geometry.
//!
//! Projects every camera into a local metric plane around the camera a
//! person just left, rasterizes their fields of view, and casts a capture
//! net along the exit direction to find where the person can reappear.

pub mod candidates;
pub mod canvas;
pub mod capture_net;
pub mod enu;
pub mod error;
pub mod half_plane;
pub mod matrix;
pub mod plot;
pub mod raster;

pub use candidates::{candidate_cameras, CandidateSearch, RasterConfig};
pub use capture_net::{CaptureNet, CaptureNetScreen};
pub use enu::enu_offset;
pub use error::{GeometryError, GeometryResult};
pub use plot::{plot_camera, plot_cameras};
pub use raster::{Grid, Screen};
