//! Footage client configuration.

use std::time::Duration;

use crate::error::{TelemetryError, TelemetryResult};
use crate::observations::DEFAULT_MIN_BOX_SIZE;
use crate::retry::RetryConfig;

pub const DEFAULT_BASE_URL: &str = "https://api2.rhombussystems.com";

/// Footage client configuration.
#[derive(Clone)]
pub struct TelemetryConfig {
    /// API root, without the `/api` suffix
    pub base_url: String,
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Normalized box width/height below which detections are dropped
    pub min_box_size: f64,
    pub retry: RetryConfig,
}

impl std::fmt::Debug for TelemetryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("min_box_size", &self.min_box_size)
            .field("retry", &self.retry)
            .finish()
    }
}

impl TelemetryConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(5),
            min_box_size: DEFAULT_MIN_BOX_SIZE,
            retry: RetryConfig::default(),
        }
    }

    /// Create config from environment variables.
    ///
    /// `API_KEY` is required.
    pub fn from_env() -> TelemetryResult<Self> {
        let api_key = std::env::var("API_KEY")
            .map_err(|_| TelemetryError::config("API_KEY must be set to reach the footage service"))?;
        if api_key.trim().is_empty() {
            return Err(TelemetryError::config("API_KEY cannot be empty"));
        }

        let base_url =
            std::env::var("FOOTAGE_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url)?;

        let timeout_secs: u64 = std::env::var("FOOTAGE_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        let min_box_size: f64 = std::env::var("MINIMUM_BOX_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MIN_BOX_SIZE);

        Ok(Self {
            timeout: Duration::from_secs(timeout_secs),
            min_box_size,
            retry: RetryConfig::from_env(),
            ..Self::new(base_url, api_key)
        })
    }
}
