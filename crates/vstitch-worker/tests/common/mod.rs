//! In-memory collaborators for pipeline tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use vstitch_media::{Concatenator, MediaError, MediaResult};
use vstitch_models::{Camera, ConnectionType, GeoPoint, ObjectId, Observation, Track, Vector2};
use vstitch_telemetry::{FootageSource, MediaAccess, TelemetryError, TelemetryResult};
use vstitch_worker::config::CombinerConfig;

/// North-facing camera; image +x points east.
pub fn camera(id: &str, lat: f64, lon: f64) -> Arc<Camera> {
    Arc::new(Camera {
        id: id.to_string(),
        heading: FRAC_PI_2,
        location: GeoPoint::new(lat, lon),
        fov: 96f64.to_radians(),
        view_distance: 57.0 / 3.281,
    })
}

pub fn sample(camera: &Arc<Camera>, id: ObjectId, x: f64, y: f64, ts: i64) -> Observation {
    Observation {
        object_id: id,
        position: Vector2::new(x, y),
        size: Vector2::new(0.1, 0.3),
        timestamp_ms: ts,
        camera: Arc::clone(camera),
    }
}

/// `count` samples walking at `dx` per step of `step_ms`, at mid height.
pub fn walk(camera: &Arc<Camera>, id: ObjectId, x0: f64, dx: f64, t0: i64, step_ms: i64, count: i64) -> Vec<Observation> {
    (0..count)
        .map(|i| sample(camera, id, x0 + dx * i as f64, 0.5, t0 + i * step_ms))
        .collect()
}

#[derive(Default)]
pub struct FakeSource {
    pub cameras: Vec<Arc<Camera>>,
    pub observations: Mutex<Vec<Observation>>,
    pub box_queries: Mutex<Vec<(String, i64, i64)>>,
    pub media_calls: Mutex<Vec<String>>,
    pub downloads: AtomicUsize,
    pub fail_downloads: AtomicBool,
}

impl FakeSource {
    pub fn new(cameras: Vec<Arc<Camera>>, observations: Vec<Observation>) -> Self {
        Self {
            cameras,
            observations: Mutex::new(observations),
            ..Default::default()
        }
    }

    pub fn network_calls(&self) -> usize {
        self.box_queries.lock().unwrap().len()
            + self.media_calls.lock().unwrap().len()
            + self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FootageSource for FakeSource {
    async fn bounding_boxes(
        &self,
        camera: &Arc<Camera>,
        start_sec: i64,
        duration_sec: i64,
    ) -> TelemetryResult<BTreeMap<ObjectId, Track>> {
        self.box_queries
            .lock()
            .unwrap()
            .push((camera.id.clone(), start_sec, duration_sec));

        let (from, to) = (start_sec * 1000, (start_sec + duration_sec) * 1000);
        let mut grouped: BTreeMap<ObjectId, Vec<Observation>> = BTreeMap::new();
        for o in self.observations.lock().unwrap().iter() {
            if o.camera.id == camera.id && o.timestamp_ms >= from && o.timestamp_ms <= to {
                grouped.entry(o.object_id).or_default().push(o.clone());
            }
        }
        Ok(grouped
            .into_iter()
            .map(|(id, samples)| (id, Track::new(id, samples)))
            .collect())
    }

    async fn cameras(&self) -> TelemetryResult<Vec<Arc<Camera>>> {
        Ok(self.cameras.clone())
    }

    async fn media_uris(
        &self,
        camera_id: &str,
        connection: ConnectionType,
        _token_duration_sec: u64,
    ) -> TelemetryResult<MediaAccess> {
        self.media_calls.lock().unwrap().push(camera_id.to_string());
        Ok(MediaAccess {
            uri_template: format!(
                "https://media.test/{}/dash/{{START_TIME}}_{{DURATION}}/{}",
                camera_id,
                connection.manifest_name()
            ),
            federated_token: format!("token-{}", camera_id),
        })
    }

    async fn download_vod(
        &self,
        access: &MediaAccess,
        _connection: ConnectionType,
        start_sec: i64,
        end_sec: i64,
        dest: &Path,
    ) -> TelemetryResult<u64> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if self.fail_downloads.load(Ordering::SeqCst) {
            return Err(TelemetryError::ServerError(503, "unavailable".into()));
        }
        let body = format!("{}:{}-{};", access.federated_token, start_sec, end_sec);
        tokio::fs::write(dest, body.as_bytes()).await?;
        Ok(body.len() as u64)
    }
}

/// Joins the listed clips byte-wise after failing a set number of times.
#[derive(Default)]
pub struct FakeConcat {
    pub failures_left: AtomicU32,
    pub always_fail: AtomicBool,
    pub calls: AtomicU32,
}

impl FakeConcat {
    pub fn failing(times: u32) -> Self {
        Self {
            failures_left: AtomicU32::new(times),
            ..Default::default()
        }
    }

    pub fn broken() -> Self {
        Self {
            always_fail: AtomicBool::new(true),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Concatenator for FakeConcat {
    async fn concat(&self, list: &Path, output: &Path) -> MediaResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let fail = self.always_fail.load(Ordering::SeqCst)
            || self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
        if fail {
            return Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                Some("moov atom not found".into()),
                Some(1),
            ));
        }

        let dir = list.parent().unwrap_or_else(|| Path::new("."));
        let mut joined = Vec::new();
        for line in tokio::fs::read_to_string(list).await?.lines() {
            let name = line.trim_start_matches("file '").trim_end_matches('\'');
            joined.extend(tokio::fs::read(dir.join(name)).await?);
        }
        tokio::fs::write(output, joined).await?;
        Ok(())
    }
}

pub fn combiner_config(root: &Path) -> CombinerConfig {
    CombinerConfig {
        output_root: root.to_path_buf(),
        ..Default::default()
    }
}
