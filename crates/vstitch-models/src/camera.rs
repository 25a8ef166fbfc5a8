//! Camera metadata and the hardware lookup table.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::angle::{degrees_to_radians, feet_to_meters, heading_from_upstream};

/// Geodetic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A fixed camera. Immutable once loaded and shared as `Arc<Camera>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    /// Stable upstream identifier
    pub id: String,
    /// Radians, 0 = east, counter-clockwise
    pub heading: f64,
    pub location: GeoPoint,
    /// Field of view in radians
    pub fov: f64,
    /// Metres
    pub view_distance: f64,
}

impl Camera {
    /// Build a camera from upstream directory fields.
    ///
    /// `upstream_heading` is clockwise from north; the hardware model picks
    /// FOV and view distance.
    pub fn from_upstream(
        id: impl Into<String>,
        upstream_heading: f64,
        location: GeoPoint,
        hardware_model: Option<&str>,
    ) -> Self {
        let spec = HardwareSpec::lookup(hardware_model);
        Self {
            id: id.into(),
            heading: heading_from_upstream(upstream_heading),
            location,
            fov: spec.fov_radians(),
            view_distance: spec.view_distance_meters(),
        }
    }
}

/// Optical characteristics of a camera hardware model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardwareSpec {
    pub fov_degrees: f64,
    pub view_distance_feet: f64,
}

impl HardwareSpec {
    /// Fallback for models missing from the table.
    pub const DEFAULT: HardwareSpec = HardwareSpec {
        fov_degrees: 112.0,
        view_distance_feet: 57.0,
    };

    /// Look up a hardware model. Unknown models fall back to [`HardwareSpec::DEFAULT`].
    pub fn lookup(model: Option<&str>) -> HardwareSpec {
        match model {
            Some("CAMERA_R100") | Some("CAMERA_R2") => HardwareSpec {
                fov_degrees: 96.0,
                view_distance_feet: 57.0,
            },
            Some("CAMERA_R1") => HardwareSpec {
                fov_degrees: 135.0,
                view_distance_feet: 44.0,
            },
            Some("CAMERA_R200") => HardwareSpec {
                fov_degrees: 112.0,
                view_distance_feet: 57.0,
            },
            other => {
                warn!(
                    hardware_model = other.unwrap_or("unknown"),
                    "Unsupported camera hardware, using default FOV and view distance"
                );
                Self::DEFAULT
            }
        }
    }

    pub fn fov_radians(&self) -> f64 {
        degrees_to_radians(self.fov_degrees)
    }

    pub fn view_distance_meters(&self) -> f64 {
        feet_to_meters(self.view_distance_feet)
    }
}
