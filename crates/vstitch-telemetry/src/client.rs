//! HTTP footage client.
//!
//! Every call carries the API-key headers and is retried on transient
//! failures. VOD segment downloads additionally carry the session cookie.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, info_span, warn, Instrument};
use vstitch_models::{Camera, ConnectionType, ObjectId, Track};

use crate::cameras::cameras_from_states;
use crate::config::TelemetryConfig;
use crate::error::{TelemetryError, TelemetryResult};
use crate::manifest::{expand_uri_template, parse_segment_template, segment_count};
use crate::metrics::{record_request, record_segment};
use crate::observations::boxes_to_tracks;
use crate::retry::with_retry;
use crate::source::FootageSource;
use crate::types::{
    BoundingBoxesRequest, BoundingBoxesResponse, CameraStateListResponse, FederatedTokenRequest,
    FederatedTokenResponse, MediaAccess, MediaUrisRequest, MediaUrisResponse,
};

/// Footage service REST client.
#[derive(Clone)]
pub struct FootageClient {
    http: Client,
    config: TelemetryConfig,
}

impl FootageClient {
    /// Create a new client.
    pub fn new(config: TelemetryConfig) -> TelemetryResult<Self> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| TelemetryError::config("API key is not a valid header value"))?;
        key.set_sensitive(true);
        headers.insert("x-auth-apikey", key);
        headers.insert("x-auth-scheme", HeaderValue::from_static("api-token"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(10)
            .user_agent(concat!("vstitch-telemetry/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> TelemetryResult<Self> {
        Self::new(TelemetryConfig::from_env()?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.config.base_url, path)
    }

    async fn execute_request<T, F>(&self, operation: &str, fut: F) -> TelemetryResult<T>
    where
        F: std::future::Future<Output = TelemetryResult<T>>,
    {
        let start = Instant::now();
        let result = fut.await;
        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, start.elapsed().as_millis() as f64);
        result
    }

    /// POST a JSON body to an API endpoint and decode the JSON reply.
    async fn post_json<B, R>(&self, operation: &str, path: &str, body: &B) -> TelemetryResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let (http, url) = (&self.http, url.as_str());
        let span = info_span!("footage_request", operation = %operation);

        self.execute_request(
            operation,
            with_retry(&self.config.retry, operation, || async move {
                let response = http.post(url).json(body).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(Self::handle_error_response(status, url, response).await);
                }
                let bytes = response.bytes().await?;
                Ok(serde_json::from_slice(&bytes)?)
            })
            .instrument(span),
        )
        .await
    }

    /// GET a media resource with the session cookie.
    async fn get_media(&self, operation: &str, uri: &str, token: &str) -> TelemetryResult<Vec<u8>> {
        let cookie = HeaderValue::from_str(&format!("RSESSIONID=RFT:{}", token))
            .map_err(|_| TelemetryError::config("session token is not a valid cookie value"))?;

        let (http, cookie) = (&self.http, &cookie);

        self.execute_request(
            operation,
            with_retry(&self.config.retry, operation, || async move {
                let response = http.get(uri).header(COOKIE, cookie.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(Self::handle_error_response(status, uri, response).await);
                }
                Ok(response.bytes().await?.to_vec())
            }),
        )
        .await
    }

    async fn handle_error_response(status: StatusCode, url: &str, response: reqwest::Response) -> TelemetryError {
        let body = response.text().await.unwrap_or_default();
        TelemetryError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }

    async fn federated_token(&self, duration_sec: u64) -> TelemetryResult<String> {
        let res: FederatedTokenResponse = self
            .post_json(
                "generate_federated_token",
                "org/generateFederatedSessionToken",
                &FederatedTokenRequest { duration_sec },
            )
            .await?;
        Ok(res.federated_session_token)
    }
}

#[async_trait]
impl FootageSource for FootageClient {
    async fn bounding_boxes(
        &self,
        camera: &Arc<Camera>,
        start_sec: i64,
        duration_sec: i64,
    ) -> TelemetryResult<BTreeMap<ObjectId, Track>> {
        let res: BoundingBoxesResponse = self
            .post_json(
                "get_bounding_boxes",
                "camera/getFootageBoundingBoxes",
                &BoundingBoxesRequest {
                    camera_uuid: &camera.id,
                    start_time: start_sec,
                    duration: duration_sec,
                },
            )
            .await?;

        let raw = res.footage_bounding_boxes.len();
        let tracks = boxes_to_tracks(camera, res.footage_bounding_boxes, start_sec, self.config.min_box_size);
        debug!(
            camera_id = %camera.id,
            start_sec,
            duration_sec,
            boxes = raw,
            tracks = tracks.len(),
            "Fetched bounding boxes"
        );
        Ok(tracks)
    }

    async fn cameras(&self) -> TelemetryResult<Vec<Arc<Camera>>> {
        let res: CameraStateListResponse = self
            .post_json(
                "get_camera_states",
                "camera/getMinimalCameraStateList",
                &serde_json::json!({}),
            )
            .await?;
        Ok(cameras_from_states(res.camera_states))
    }

    async fn media_uris(
        &self,
        camera_id: &str,
        connection: ConnectionType,
        token_duration_sec: u64,
    ) -> TelemetryResult<MediaAccess> {
        let res: MediaUrisResponse = self
            .post_json(
                "get_media_uris",
                "camera/getMediaUris",
                &MediaUrisRequest {
                    camera_uuid: camera_id,
                },
            )
            .await?;

        let uri_template = match connection {
            ConnectionType::Lan => res.lan_vod_mpd_uris_templates.into_iter().next(),
            ConnectionType::Wan => res.wan_vod_mpd_uri_template,
        }
        .ok_or_else(|| {
            TelemetryError::invalid_response(format!(
                "no {} VOD template for camera {}",
                connection, camera_id
            ))
        })?;

        let federated_token = self.federated_token(token_duration_sec).await?;
        Ok(MediaAccess {
            uri_template,
            federated_token,
        })
    }

    async fn download_vod(
        &self,
        access: &MediaAccess,
        connection: ConnectionType,
        start_sec: i64,
        end_sec: i64,
        dest: &Path,
    ) -> TelemetryResult<u64> {
        let duration = end_sec - start_sec + 1;
        if duration <= 0 {
            return Err(TelemetryError::request_failed(format!(
                "empty VOD window [{}, {}]",
                start_sec, end_sec
            )));
        }

        let manifest_uri = expand_uri_template(&access.uri_template, start_sec, duration);
        let manifest_name = connection.manifest_name();
        if !manifest_uri.contains(manifest_name) {
            warn!(uri = %manifest_uri, manifest_name, "VOD URI does not end in the expected manifest");
        }

        let token = &access.federated_token;
        let mpd = self.get_media("get_manifest", &manifest_uri, token).await?;
        let template = parse_segment_template(&String::from_utf8_lossy(&mpd))?;

        let init = self
            .get_media("get_segment", &template.init_uri(&manifest_uri, manifest_name), token)
            .await?;
        tokio::fs::write(dest, &init).await?;
        record_segment(init.len());
        let mut written = init.len() as u64;

        let mut file = tokio::fs::OpenOptions::new().append(true).open(dest).await?;
        let segments = segment_count(duration);
        for i in 0..segments {
            let uri = template.segment_uri(&manifest_uri, manifest_name, i);
            let bytes = self.get_media("get_segment", &uri, token).await?;
            file.write_all(&bytes).await?;
            record_segment(bytes.len());
            written += bytes.len() as u64;
        }
        file.flush().await?;

        info!(
            start_sec,
            end_sec,
            segments,
            bytes = written,
            path = %dest.display(),
            "Downloaded VOD"
        );
        Ok(written)
    }
}
