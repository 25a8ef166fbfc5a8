//! HTTP client tests against a mock footage service.

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use vstitch_models::{Camera, ConnectionType, GeoPoint};
use vstitch_telemetry::{FootageClient, FootageSource, RetryConfig, TelemetryConfig, TelemetryError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> FootageClient {
    let mut config = TelemetryConfig::new(server.uri(), "test-key");
    config.retry = RetryConfig {
        max_retries: 2,
        base_delay_ms: 1,
        max_delay_ms: 5,
    };
    FootageClient::new(config).unwrap()
}

fn camera(id: &str) -> Arc<Camera> {
    Arc::new(Camera::from_upstream(id, 0.0, GeoPoint::new(37.0, -122.0), Some("CAMERA_R200")))
}

#[tokio::test]
async fn test_bounding_boxes_sends_auth_and_groups_tracks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/camera/getFootageBoundingBoxes"))
        .and(header("x-auth-apikey", "test-key"))
        .and(header("x-auth-scheme", "api-token"))
        .and(body_json(json!({"cameraUuid": "cam-1", "startTime": 100, "duration": 30})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "footageBoundingBoxes": [
                {"a": "MOTION_HUMAN", "objectId": 4, "ts": 101_500, "l": 4000, "r": 5000, "t": 2000, "b": 8000},
                {"a": "MOTION_HUMAN", "objectId": 4, "ts": 100_500, "l": 3000, "r": 4000, "t": 2000, "b": 8000},
                {"a": "MOTION_HUMAN", "objectId": 5, "ts": 99_000, "l": 3000, "r": 4000, "t": 2000, "b": 8000},
                {"a": "MOTION_CAR", "objectId": 6, "ts": 100_500, "l": 0, "r": 9000, "t": 0, "b": 9000}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tracks = client(&server)
        .bounding_boxes(&camera("cam-1"), 100, 30)
        .await
        .unwrap();

    assert_eq!(tracks.len(), 1);
    let track = &tracks[&4];
    assert_eq!(track.start_ms(), Some(100_500));
    assert!((track.samples[0].position.x - 0.35).abs() < 1e-12);
    assert!((track.samples[1].position.x - 0.45).abs() < 1e-12);
}

#[tokio::test]
async fn test_cameras_skip_incomplete_entries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/camera/getMinimalCameraStateList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cameraStates": [
                {"uuid": "a", "latitude": 37.0, "longitude": -122.0, "directionRadians": 1.0, "hwVariation": "CAMERA_R2"},
                {"uuid": "b", "latitude": 37.0, "directionRadians": 1.0},
                {"uuid": "c", "latitude": 37.0, "longitude": -122.0, "directionRadians": 2.0, "hwVariation": "CAMERA_X9"}
            ]
        })))
        .mount(&server)
        .await;

    let cameras = client(&server).cameras().await.unwrap();
    let ids: Vec<&str> = cameras.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert!((cameras[0].fov - 96f64.to_radians()).abs() < 1e-9);
    assert!((cameras[1].fov - 112f64.to_radians()).abs() < 1e-9);
}

#[tokio::test]
async fn test_media_uris_picks_connection_template() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/camera/getMediaUris"))
        .and(body_json(json!({"cameraUuid": "cam-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lanVodMpdUrisTemplates": ["https://lan/{START_TIME}/{DURATION}/clip.mpd"],
            "wanVodMpdUriTemplate": "https://wan/{START_TIME}/{DURATION}/file.mpd"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/org/generateFederatedSessionToken"))
        .and(body_json(json!({"durationSec": 60})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "federatedSessionToken": "tok-123"
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let lan = client.media_uris("cam-1", ConnectionType::Lan, 60).await.unwrap();
    assert_eq!(lan.uri_template, "https://lan/{START_TIME}/{DURATION}/clip.mpd");
    assert_eq!(lan.federated_token, "tok-123");

    let wan = client.media_uris("cam-1", ConnectionType::Wan, 60).await.unwrap();
    assert_eq!(wan.uri_template, "https://wan/{START_TIME}/{DURATION}/file.mpd");
}

#[tokio::test]
async fn test_retries_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/camera/getMinimalCameraStateList"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/camera/getMinimalCameraStateList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cameraStates": []})))
        .mount(&server)
        .await;

    let cameras = client(&server).cameras().await.unwrap();
    assert!(cameras.is_empty());
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/camera/getMinimalCameraStateList"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).cameras().await.unwrap_err();
    assert!(matches!(err, TelemetryError::AuthError(_)));
}

#[tokio::test]
async fn test_download_vod_concatenates_segments() {
    let server = MockServer::start().await;
    let cookie = "RSESSIONID=RFT:tok-123";

    let mpd = r#"<MPD><Period><AdaptationSet>
        <SegmentTemplate media="seg_$Number$.m4v" initialization="seg_init.mp4" startNumber="1"/>
    </AdaptationSet></Period></MPD>"#;

    Mock::given(method("GET"))
        .and(path("/dash/100/5/clip.mpd"))
        .and(header("cookie", cookie))
        .respond_with(ResponseTemplate::new(200).set_body_string(mpd))
        .mount(&server)
        .await;

    for (name, body) in [
        ("seg_init.mp4", "INIT"),
        ("seg_1.m4v", "A"),
        ("seg_2.m4v", "B"),
        ("seg_3.m4v", "C"),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/dash/100/5/{}", name)))
            .and(header("cookie", cookie))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("0.mp4");
    // Stale content from an earlier attempt must be replaced.
    std::fs::write(&dest, b"stale").unwrap();

    let access = vstitch_telemetry::MediaAccess {
        uri_template: format!("{}/dash/{{START_TIME}}/{{DURATION}}/clip.mpd", server.uri()),
        federated_token: "tok-123".to_string(),
    };

    let written = client(&server)
        .download_vod(&access, ConnectionType::Lan, 100, 104, &dest)
        .await
        .unwrap();

    assert_eq!(written, 7);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "INITABC");
}

#[tokio::test]
async fn test_download_vod_rejects_bad_manifest() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dash/100/5/file.mpd"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<MPD/>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let access = vstitch_telemetry::MediaAccess {
        uri_template: format!("{}/dash/{{START_TIME}}/{{DURATION}}/file.mpd", server.uri()),
        federated_token: "tok".to_string(),
    };

    let err = client(&server)
        .download_vod(&access, ConnectionType::Wan, 100, 104, &dir.path().join("0.mp4"))
        .await
        .unwrap_err();
    assert!(matches!(err, TelemetryError::InvalidManifest(_)));
}
