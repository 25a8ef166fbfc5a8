//! Structured chain logging utilities.
//!
//! Provides consistent, structured logging for one chain's trip through
//! the pipelines, with tracing spans and contextual information.

use tracing::{error, info, warn, Span};
use vstitch_models::FinalizedEvent;

/// Chain logger for structured logging with consistent formatting.
///
/// Every line carries the chain key (start timestamp of the head) and
/// the stage that emitted it.
#[derive(Debug, Clone)]
pub struct ChainLogger {
    chain_key: i64,
    stage: String,
}

impl ChainLogger {
    /// Create a logger keyed on the head of `chain`.
    pub fn new(chain: &FinalizedEvent, stage: &str) -> Self {
        Self::from_key(chain.start_ms, stage)
    }

    pub fn from_key(chain_key: i64, stage: &str) -> Self {
        Self {
            chain_key,
            stage: stage.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            chain = self.chain_key,
            stage = %self.stage,
            "Chain started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            chain = self.chain_key,
            stage = %self.stage,
            "Chain progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            chain = self.chain_key,
            stage = %self.stage,
            "Chain warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            chain = self.chain_key,
            stage = %self.stage,
            "Chain error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            chain = self.chain_key,
            stage = %self.stage,
            "Chain completed: {}", message
        );
    }

    pub fn chain_key(&self) -> i64 {
        self.chain_key
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Create a tracing span for this chain.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "chain",
            chain = self.chain_key,
            stage = %self.stage
        )
    }
}
