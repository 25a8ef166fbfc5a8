//! Person re-identification and clip stitching worker.
//!
//! This crate provides:
//! - Exit detection on the subject's camera
//! - Candidate search on neighbouring cameras
//! - Chain resolution and clip download with concatenation retries
//! - Dashboard fan-out and subject suggestions
//! - The periodic worker loop

pub mod combiner;
pub mod config;
pub mod detection;
pub mod error;
pub mod executor;
pub mod logging;
pub mod metrics;
pub mod publisher;
pub mod related;
pub mod suggestions;

pub use combiner::{hop_windows, ClipCombiner, CombineOutcome, HopWindow};
pub use config::{CombinerConfig, DetectionConfig, RelatedConfig, WorkerConfig};
pub use detection::detect_exit_events;
pub use error::{WorkerError, WorkerResult};
pub use executor::{PassReport, StitchWorker};
pub use logging::ChainLogger;
pub use publisher::PlotPublisher;
pub use related::{attach_related, RelatedSearch};
pub use suggestions::{recent_subjects, thumbnail_url};
