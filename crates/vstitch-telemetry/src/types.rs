//! Wire types for the footage service REST API.

use serde::{Deserialize, Serialize};

/// Activity tag the service puts on boxes around people.
pub const HUMAN_ACTIVITY: &str = "MOTION_HUMAN";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBoxesRequest<'a> {
    pub camera_uuid: &'a str,
    /// Seconds since the epoch
    pub start_time: i64,
    /// Seconds
    pub duration: i64,
}

/// One detection box. Edges are in permyriad of the frame (0..10000).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBoundingBox {
    /// Activity tag
    #[serde(default)]
    pub a: Option<String>,
    pub object_id: i64,
    /// Milliseconds since the epoch
    pub ts: i64,
    pub l: f64,
    pub r: f64,
    pub t: f64,
    pub b: f64,
}

impl RawBoundingBox {
    pub fn is_human(&self) -> bool {
        self.a.as_deref() == Some(HUMAN_ACTIVITY)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBoxesResponse {
    #[serde(default)]
    pub footage_bounding_boxes: Vec<RawBoundingBox>,
}

/// Camera directory entry. Any positional field may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraState {
    pub uuid: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Clockwise from north
    #[serde(default)]
    pub direction_radians: Option<f64>,
    #[serde(default)]
    pub hw_variation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraStateListResponse {
    #[serde(default)]
    pub camera_states: Vec<CameraState>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUrisRequest<'a> {
    pub camera_uuid: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUrisResponse {
    #[serde(default)]
    pub lan_vod_mpd_uris_templates: Vec<String>,
    #[serde(default)]
    pub wan_vod_mpd_uri_template: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedTokenRequest {
    pub duration_sec: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedTokenResponse {
    pub federated_session_token: String,
}

/// Everything needed to download footage from one camera.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAccess {
    /// VOD manifest URI with `{START_TIME}` and `{DURATION}` placeholders
    pub uri_template: String,
    /// Short-lived session token sent as a cookie
    pub federated_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_wire_format() {
        let json = r#"{"footageBoundingBoxes":[
            {"a":"MOTION_HUMAN","objectId":12,"ts":1000,"l":100,"r":300,"t":200,"b":900},
            {"a":"MOTION_CAR","objectId":13,"ts":1000,"l":0,"r":1,"t":0,"b":1}
        ]}"#;
        let res: BoundingBoxesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(res.footage_bounding_boxes.len(), 2);
        assert!(res.footage_bounding_boxes[0].is_human());
        assert!(!res.footage_bounding_boxes[1].is_human());
    }

    #[test]
    fn test_camera_state_missing_fields() {
        let json = r#"{"cameraStates":[{"uuid":"abc","latitude":37.1}]}"#;
        let res: CameraStateListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(res.camera_states[0].longitude, None);
        assert_eq!(res.camera_states[0].direction_radians, None);
    }

    #[test]
    fn test_request_bodies_are_camel_case() {
        let body = serde_json::to_value(BoundingBoxesRequest {
            camera_uuid: "cam",
            start_time: 10,
            duration: 30,
        })
        .unwrap();
        assert_eq!(body["cameraUuid"], "cam");
        assert_eq!(body["startTime"], 10);

        let body = serde_json::to_value(FederatedTokenRequest { duration_sec: 60 }).unwrap();
        assert_eq!(body["durationSec"], 60);
    }
}
