//! Dashboard messages.
//!
//! Published one-way and best-effort; nothing in the pipeline waits on a
//! consumer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::event::FinalizedEvent;
use crate::observation::ObjectId;
use crate::vector::Vector2;

/// A camera's field of view as a triangle in the local metric plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CameraPlot {
    pub camera_id: String,
    /// Counter-clockwise, apex included
    pub vertices: [Vector2; 3],
    /// Heading after the common offset rotation
    pub rotation: f64,
    /// Camera position (triangle apex)
    pub position: Vector2,
}

/// One non-empty pixel of a rasterized grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    /// Cameras covering the pixel. Empty for capture-net grids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cameras: Vec<String>,
}

/// Sparse copy of a rasterized grid for visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GridSnapshot {
    pub screen_size: usize,
    pub pixel_size: f64,
    pub meter_span: f64,
    pub cells: Vec<GridCell>,
}

/// A recently seen person, offered as a subject to follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSuggestion {
    pub camera_id: String,
    pub object_id: ObjectId,
    pub timestamp_ms: i64,
    pub thumbnail_url: Option<String>,
}

/// Dashboard message envelope.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlotMessage {
    /// A resolved chain
    PlotGraph { event: FinalizedEvent },

    /// Camera layout around an exit, with the capture net that was cast
    PlotCameras {
        cameras: Vec<CameraPlot>,
        screen: GridSnapshot,
        #[serde(rename = "netScreen")]
        net_screen: GridSnapshot,
    },

    /// Camera currently being followed
    CameraId {
        #[serde(rename = "cameraId")]
        camera_id: String,
    },

    /// Recent people to pick a subject from
    RecentSubjects { subjects: Vec<SubjectSuggestion> },
}

impl PlotMessage {
    pub fn camera_id(id: impl Into<String>) -> Self {
        PlotMessage::CameraId {
            camera_id: id.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PlotMessage::PlotGraph { .. } => "plot_graph",
            PlotMessage::PlotCameras { .. } => "plot_cameras",
            PlotMessage::CameraId { .. } => "camera_id",
            PlotMessage::RecentSubjects { .. } => "recent_subjects",
        }
    }
}
