//! Footage service client.
//!
//! This crate provides:
//! - The [`FootageSource`] trait the pipelines read through
//! - An HTTP implementation with API-key auth, retries and metrics
//! - Conversion of raw detection boxes into tracks
//! - The camera directory with hardware lookup
//! - DASH VOD download into a single file

pub mod cameras;
pub mod client;
pub mod config;
pub mod error;
pub mod manifest;
pub mod metrics;
pub mod observations;
pub mod retry;
pub mod source;
pub mod types;

pub use client::FootageClient;
pub use config::TelemetryConfig;
pub use error::{TelemetryError, TelemetryResult};
pub use retry::RetryConfig;
pub use source::FootageSource;
pub use types::MediaAccess;
