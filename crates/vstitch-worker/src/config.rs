//! Worker configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use vstitch_geometry::RasterConfig;
use vstitch_media::FfmpegRunner;
use vstitch_models::{ConnectionType, ObjectId};
use vstitch_tracking::{ChainConfig, IsolationConfig};

use crate::error::{WorkerError, WorkerResult};

/// Exit-event detection window.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Length of the window searched for exits
    pub duration_secs: i64,
    /// How far before the anchor the window ends
    pub offset_secs: i64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            duration_secs: 600,
            offset_secs: 30,
        }
    }
}

impl DetectionConfig {
    /// `[anchor - offset - duration, anchor - offset]` in whole seconds.
    pub fn window(&self, anchor_ms: i64) -> (i64, i64) {
        let end = anchor_ms.div_euclid(1000) - self.offset_secs;
        (end - self.duration_secs, end)
    }
}

/// Search for enter events on neighbouring cameras.
#[derive(Debug, Clone)]
pub struct RelatedConfig {
    /// How long after an exit to look for the matching enter
    pub duration_secs: i64,
    /// Concurrent per-camera telemetry queries
    pub max_parallel_queries: usize,
}

impl Default for RelatedConfig {
    fn default() -> Self {
        Self {
            duration_secs: 30,
            max_parallel_queries: 4,
        }
    }
}

/// Clip download and concatenation.
#[derive(Debug, Clone)]
pub struct CombinerConfig {
    /// Padding before the first hop and after the last hop
    pub edge_padding_ms: i64,
    /// Padding at every camera switch
    pub padding_ms: i64,
    /// Full restarts allowed after a failed concatenation
    pub retry_max: u32,
    /// Parent of the per-chain working directories
    pub output_root: PathBuf,
    /// Lifetime requested for each media session token
    pub token_duration_secs: u64,
    /// Kill a concatenation that runs longer; unlimited when unset
    pub ffmpeg_timeout_secs: Option<u64>,
}

impl Default for CombinerConfig {
    fn default() -> Self {
        Self {
            edge_padding_ms: 4000,
            padding_ms: 1500,
            retry_max: 3,
            output_root: PathBuf::from("res"),
            token_duration_secs: 60,
            ffmpeg_timeout_secs: Some(600),
        }
    }
}

impl CombinerConfig {
    /// FFmpeg runner honouring the configured timeout.
    pub fn ffmpeg_runner(&self) -> FfmpegRunner {
        match self.ffmpeg_timeout_secs {
            Some(secs) => FfmpegRunner::new().with_timeout(secs),
            None => FfmpegRunner::new(),
        }
    }
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub isolation: IsolationConfig,
    pub chain: ChainConfig,
    pub raster: RasterConfig,
    pub detection: DetectionConfig,
    pub related: RelatedConfig,
    pub combiner: CombinerConfig,
    pub connection: ConnectionType,
    /// Camera the subject was first seen on
    pub camera_id: Option<String>,
    /// Subject to follow; every exit is followed when unset
    pub object_id: Option<ObjectId>,
    /// Fixed anchor time; "now" on every poll when unset
    pub anchor_time_ms: Option<i64>,
    /// Time between pipeline runs
    pub poll_interval: Duration,
    /// Time between dashboard re-publications
    pub plot_interval: Duration,
    /// Window searched for subject suggestions
    pub suggested_window_secs: i64,
    /// Prometheus listener port, disabled when unset
    pub metrics_port: Option<u16>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            isolation: IsolationConfig::default(),
            chain: ChainConfig::default(),
            raster: RasterConfig::default(),
            detection: DetectionConfig::default(),
            related: RelatedConfig::default(),
            combiner: CombinerConfig::default(),
            connection: ConnectionType::Lan,
            camera_id: None,
            object_id: None,
            anchor_time_ms: None,
            poll_interval: Duration::from_secs(10),
            plot_interval: Duration::from_secs(1),
            suggested_window_secs: 600,
            metrics_port: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    ///
    /// Malformed values fall back to defaults, except `CONNECTION_TYPE`,
    /// `OBJECT_ID` and `ANCHOR_TIME_MS`, which are rejected.
    pub fn from_env() -> WorkerResult<Self> {
        let d = Self::default();

        let connection = match std::env::var("CONNECTION_TYPE") {
            Ok(v) => v
                .parse::<ConnectionType>()
                .map_err(|e| WorkerError::config_error(e.to_string()))?,
            Err(_) => d.connection,
        };

        Ok(Self {
            isolation: IsolationConfig::from_env(),
            chain: ChainConfig::from_env(),
            raster: RasterConfig::from_env(),
            detection: DetectionConfig {
                duration_secs: env_or(
                    "EXIT_EVENT_DETECTION_DURATION_SECONDS",
                    d.detection.duration_secs,
                ),
                offset_secs: env_or(
                    "EXIT_EVENT_DETECTION_OFFSET_SECONDS",
                    d.detection.offset_secs,
                ),
            },
            related: RelatedConfig {
                duration_secs: env_or(
                    "RELATED_EVENT_DETECTION_DURATION_SECONDS",
                    d.related.duration_secs,
                ),
                max_parallel_queries: env_or("MAX_PARALLEL_QUERIES", d.related.max_parallel_queries)
                    .max(1),
            },
            combiner: CombinerConfig {
                edge_padding_ms: env_or(
                    "CLIP_COMBINATION_EDGE_PADDING_MILISECONDS",
                    d.combiner.edge_padding_ms,
                ),
                padding_ms: env_or("CLIP_COMBINATION_PADDING_MILISECONDS", d.combiner.padding_ms),
                retry_max: env_or("CLIP_COMBINATION_RETRY_MAX", d.combiner.retry_max),
                output_root: std::env::var("OUTPUT_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or(d.combiner.output_root),
                token_duration_secs: env_or(
                    "MEDIA_TOKEN_DURATION_SECONDS",
                    d.combiner.token_duration_secs,
                ),
                ffmpeg_timeout_secs: match std::env::var("FFMPEG_TIMEOUT_SECONDS") {
                    Ok(v) => match v.trim().parse::<u64>() {
                        Ok(0) => None,
                        Ok(secs) => Some(secs),
                        Err(_) => d.combiner.ffmpeg_timeout_secs,
                    },
                    Err(_) => d.combiner.ffmpeg_timeout_secs,
                },
            },
            connection,
            camera_id: std::env::var("CAMERA_ID").ok().filter(|s| !s.trim().is_empty()),
            object_id: env_required_parse("OBJECT_ID")?,
            anchor_time_ms: env_required_parse("ANCHOR_TIME_MS")?,
            poll_interval: Duration::from_secs(env_or("POLL_INTERVAL_SECONDS", 10)),
            plot_interval: Duration::from_millis(env_or("PLOT_INTERVAL_MILISECONDS", 1000)),
            suggested_window_secs: env_or(
                "SUGGESTED_HUMAN_EVENT_SECONDS_SINCE_CURRENT_TIME",
                d.suggested_window_secs,
            ),
            metrics_port: std::env::var("METRICS_PORT").ok().and_then(|s| s.parse().ok()),
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Unset is `None`; set but unparseable is an error.
fn env_required_parse<T: FromStr>(key: &str) -> WorkerResult<Option<T>> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| WorkerError::config_error(format!("{} is not valid: {}", key, v))),
        _ => Ok(None),
    }
}
