//! Periodic detection, chaining and stitching loop.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};
use vstitch_media::Concatenator;
use vstitch_models::{Camera, ConnectionType, FinalizedEvent, PlotMessage};
use vstitch_telemetry::FootageSource;
use vstitch_tracking::resolve_chains;

use crate::combiner::{ClipCombiner, CombineOutcome};
use crate::config::WorkerConfig;
use crate::detection::detect_exit_events;
use crate::error::{WorkerError, WorkerResult};
use crate::metrics;
use crate::publisher::PlotPublisher;
use crate::related::{attach_related, RelatedSearch};
use crate::suggestions::recent_subjects;

/// Result of one pass over the subject's camera.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Exits found on the subject's camera
    pub exits: usize,
    pub chains: Vec<FinalizedEvent>,
    pub outcomes: Vec<CombineOutcome>,
    /// Chains whose concatenation never succeeded
    pub failed: usize,
}

/// Follows one subject across cameras and stitches what it finds.
pub struct StitchWorker {
    config: WorkerConfig,
    source: Arc<dyn FootageSource>,
    combiner: ClipCombiner,
    publisher: PlotPublisher,
    shutdown: watch::Sender<bool>,
}

impl StitchWorker {
    pub fn new(
        config: WorkerConfig,
        source: Arc<dyn FootageSource>,
        concat: Arc<dyn Concatenator>,
        publisher: PlotPublisher,
    ) -> Self {
        let combiner = ClipCombiner::new(Arc::clone(&source), concat, config.combiner.clone());
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            source,
            combiner,
            publisher,
            shutdown,
        }
    }

    pub fn publisher(&self) -> &PlotPublisher {
        &self.publisher
    }

    /// Stop `run` after the pass in progress.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Detect, chain and stitch once, anchored at `anchor_ms`.
    pub async fn run_once(
        &self,
        camera: &Arc<Camera>,
        cameras: &[Arc<Camera>],
        anchor_ms: i64,
    ) -> WorkerResult<PassReport> {
        let exits = detect_exit_events(
            self.source.as_ref(),
            camera,
            self.config.object_id,
            anchor_ms,
            &self.config.detection,
            &self.config.isolation,
        )
        .await?;
        let exit_count = exits.len();

        let search = RelatedSearch {
            cameras,
            related: &self.config.related,
            isolation: &self.config.isolation,
            raster: &self.config.raster,
        };
        let exits = attach_related(self.source.as_ref(), exits, search, Some(&self.publisher)).await?;

        let chains = resolve_chains(exits, &self.config.chain);
        metrics::record_chains(chains.len());

        let mut report = PassReport {
            exits: exit_count,
            ..PassReport::default()
        };
        for chain in &chains {
            match self.combiner.combine(chain, self.config.connection).await {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e @ WorkerError::ConcatExhausted { .. }) => {
                    error!(chain = chain.start_ms, error = %e, "Chain left unstitched");
                    report.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }
        report.chains = chains;

        info!(
            camera_id = %camera.id,
            exits = report.exits,
            chains = report.chains.len(),
            stitched = report.outcomes.len(),
            failed = report.failed,
            "Pass complete"
        );
        Ok(report)
    }

    /// Run until [`StitchWorker::shutdown`] is called.
    pub async fn run(&self) -> WorkerResult<()> {
        let mut shutdown_rx = self.shutdown.subscribe();

        if self.config.connection == ConnectionType::Wan {
            warn!("Running over WAN; use LAN whenever the cameras are reachable locally");
        }

        let cameras = self.source.cameras().await?;
        info!(cameras = cameras.len(), "Loaded camera directory");

        if self.config.camera_id.is_none() || self.config.object_id.is_none() {
            self.suggest_subjects(&cameras).await;
        }

        let camera_id = self.config.camera_id.as_deref().ok_or_else(|| {
            WorkerError::config_error("CAMERA_ID must be set to pick a subject to follow")
        })?;
        let camera = cameras
            .iter()
            .find(|c| c.id == camera_id)
            .cloned()
            .ok_or_else(|| WorkerError::camera_not_found(camera_id))?;

        if *shutdown_rx.borrow_and_update() {
            info!("Shutdown requested before the first pass");
            return Ok(());
        }

        let mut poll = tokio::time::interval(self.config.poll_interval);
        let mut plot = tokio::time::interval(self.config.plot_interval);
        let mut latest: Vec<FinalizedEvent> = Vec::new();

        info!(camera_id = %camera.id, subject = ?self.config.object_id, "Following subject");

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping worker");
                        break;
                    }
                }
                _ = poll.tick() => {
                    let anchor_ms = self
                        .config
                        .anchor_time_ms
                        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
                    match self.run_once(&camera, &cameras, anchor_ms).await {
                        Ok(report) => latest = report.chains,
                        Err(e) if e.is_retryable() => warn!(error = %e, "Pass failed, retrying next poll"),
                        Err(e) => error!(error = %e, "Pass failed"),
                    }
                }
                _ = plot.tick() => {
                    self.publisher.send(PlotMessage::camera_id(camera.id.clone()));
                    for chain in &latest {
                        self.publisher.send(PlotMessage::PlotGraph { event: chain.clone() });
                    }
                }
            }
        }

        info!("Worker stopped");
        Ok(())
    }

    async fn suggest_subjects(&self, cameras: &[Arc<Camera>]) {
        let now_ms = chrono::Utc::now().timestamp_millis();
        match recent_subjects(
            self.source.as_ref(),
            cameras,
            now_ms,
            self.config.suggested_window_secs,
            &self.config.isolation,
            self.config.combiner.token_duration_secs,
        )
        .await
        {
            Ok(subjects) => {
                for (i, s) in subjects.iter().enumerate() {
                    info!(
                        index = i,
                        camera_id = %s.camera_id,
                        object_id = s.object_id,
                        timestamp_ms = s.timestamp_ms,
                        url = s.thumbnail_url.as_deref().unwrap_or("-"),
                        "Recent subject"
                    );
                }
                self.publisher.send(PlotMessage::RecentSubjects { subjects });
            }
            Err(e) => warn!(error = %e, "Could not list recent subjects"),
        }
    }
}
