//! Download every hop of a chain and stitch the clips into one video.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn, Instrument};
use vstitch_media::{
    append_concat_entry, clip_file_name, ensure_dir, remove_dir_if_exists, Concatenator,
    CONCAT_LIST_NAME, OUTPUT_NAME,
};
use vstitch_models::{ConnectionType, FinalizedEvent};
use vstitch_telemetry::FootageSource;

use crate::config::CombinerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::ChainLogger;
use crate::metrics;

/// Footage window for one node of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopWindow {
    pub index: usize,
    pub camera_id: String,
    pub start_sec: i64,
    pub end_sec: i64,
}

/// Padded download windows for every node of `chain`, head first.
///
/// The first node gets the edge padding before it and the last node the
/// edge padding after it; every camera switch gets the shorter padding.
pub fn hop_windows(chain: &FinalizedEvent, config: &CombinerConfig) -> WorkerResult<Vec<HopWindow>> {
    let last = chain.chain_len() - 1;
    chain
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let lead = if index == 0 { config.edge_padding_ms } else { config.padding_ms };
            let trail = if index == last { config.edge_padding_ms } else { config.padding_ms };
            let camera_id = node.camera_id().ok_or_else(|| {
                WorkerError::invalid_chain(format!("node {} of chain {} has no samples", index, chain.start_ms))
            })?;
            Ok(HopWindow {
                index,
                camera_id: camera_id.to_string(),
                start_sec: (node.start_ms - lead).div_euclid(1000),
                end_sec: (node.end_ms + trail + 999).div_euclid(1000),
            })
        })
        .collect()
}

/// What a combination call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombineOutcome {
    /// The working directory already existed; nothing was fetched
    Skipped { dir: PathBuf },
    Stitched {
        output: PathBuf,
        hops: usize,
        attempts: u32,
    },
}

/// Stitches resolved chains into `<output_root>/<start_ms>/output.mp4`.
pub struct ClipCombiner {
    source: Arc<dyn FootageSource>,
    concat: Arc<dyn Concatenator>,
    config: CombinerConfig,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl ClipCombiner {
    pub fn new(
        source: Arc<dyn FootageSource>,
        concat: Arc<dyn Concatenator>,
        config: CombinerConfig,
    ) -> Self {
        Self {
            source,
            concat,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CombinerConfig {
        &self.config
    }

    /// Working directory for the chain starting at `start_ms`.
    pub fn working_dir(&self, start_ms: i64) -> PathBuf {
        self.config.output_root.join(start_ms.to_string())
    }

    /// Download and stitch `chain`.
    ///
    /// A failed concatenation wipes the working directory and starts over,
    /// up to `retry_max` times. Download errors clean up and propagate.
    pub async fn combine(
        &self,
        chain: &FinalizedEvent,
        connection: ConnectionType,
    ) -> WorkerResult<CombineOutcome> {
        let logger = ChainLogger::new(chain, "combine");
        let dir = self.working_dir(chain.start_ms);

        let lock = self.lock_for(&dir).await;
        let _guard = lock.lock().await;

        self.run(chain, connection, &dir, &logger)
            .instrument(logger.create_span())
            .await
    }

    async fn run(
        &self,
        chain: &FinalizedEvent,
        connection: ConnectionType,
        dir: &Path,
        logger: &ChainLogger,
    ) -> WorkerResult<CombineOutcome> {
        if tokio::fs::try_exists(dir).await? {
            logger.log_progress("already downloaded, skipping");
            metrics::record_clip("skipped");
            return Ok(CombineOutcome::Skipped {
                dir: dir.to_path_buf(),
            });
        }

        let hops = hop_windows(chain, &self.config)?;
        logger.log_start(&format!("{} hops over {}", hops.len(), connection));

        let max_attempts = self.config.retry_max + 1;
        for attempt in 1..=max_attempts {
            ensure_dir(dir).await?;

            if let Err(e) = self.download_hops(&hops, dir, connection).await {
                logger.log_error(&format!("download failed: {}", e));
                self.discard(dir).await;
                metrics::record_clip("failed");
                return Err(e);
            }

            let output = dir.join(OUTPUT_NAME);
            match self.concat.concat(&dir.join(CONCAT_LIST_NAME), &output).await {
                Ok(()) => {
                    logger.log_completion(&format!("stitched video at {}", output.display()));
                    metrics::record_clip("stitched");
                    return Ok(CombineOutcome::Stitched {
                        output,
                        hops: hops.len(),
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    warn!(attempt, max_attempts, error = %e, "Concatenation failed");
                    self.discard(dir).await;
                    if attempt < max_attempts {
                        metrics::record_concat_retry();
                    }
                }
            }
        }

        logger.log_error("giving up after repeated concatenation failures");
        metrics::record_clip("failed");
        Err(WorkerError::ConcatExhausted {
            attempts: max_attempts,
            dir: dir.to_path_buf(),
        })
    }

    async fn download_hops(
        &self,
        hops: &[HopWindow],
        dir: &Path,
        connection: ConnectionType,
    ) -> WorkerResult<()> {
        let list = dir.join(CONCAT_LIST_NAME);
        for hop in hops {
            let access = self
                .source
                .media_uris(&hop.camera_id, connection, self.config.token_duration_secs)
                .await?;

            let name = clip_file_name(hop.index);
            let bytes = self
                .source
                .download_vod(&access, connection, hop.start_sec, hop.end_sec, &dir.join(&name))
                .await?;
            append_concat_entry(&list, &name, hop.index == 0).await?;

            info!(
                camera_id = %hop.camera_id,
                hop = hop.index,
                start_sec = hop.start_sec,
                end_sec = hop.end_sec,
                bytes,
                "Downloaded hop"
            );
        }
        Ok(())
    }

    async fn discard(&self, dir: &Path) {
        if let Err(e) = remove_dir_if_exists(dir).await {
            warn!(dir = %dir.display(), error = %e, "Failed to remove working directory");
        }
    }

    async fn lock_for(&self, dir: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(dir.to_path_buf()).or_default())
    }
}
