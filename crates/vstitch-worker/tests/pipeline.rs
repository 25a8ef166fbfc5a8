//! End-to-end scenarios over in-memory collaborators.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use vstitch_geometry::RasterConfig;
use vstitch_media::{CONCAT_LIST_NAME, OUTPUT_NAME};
use vstitch_models::{ConnectionType, ExitEvent, PlotMessage, Track, Vector2};
use vstitch_tracking::{resolve_chains, ChainConfig, IsolationConfig};
use vstitch_worker::{
    attach_related, detect_exit_events, recent_subjects, ClipCombiner, CombineOutcome,
    DetectionConfig, PlotPublisher, RelatedConfig, RelatedSearch, StitchWorker, WorkerConfig,
    WorkerError,
};

use common::{camera, combiner_config, walk, FakeConcat, FakeSource};

const ANCHOR_MS: i64 = 1_000_000;

fn raster() -> RasterConfig {
    RasterConfig {
        pixels_per_meter: 2.0,
        ..Default::default()
    }
}

/// Person walks off the right of camera A and into camera B, which sits
/// about 26 m east.
fn handoff_source() -> FakeSource {
    let a = camera("cam-a", 37.0, -122.0);
    let b = camera("cam-b", 37.0, -121.9997);
    let c = camera("cam-c", 37.0, -122.0003);

    let mut observations = walk(&a, 1, 0.5, 0.05, 500_000, 444, 10);
    observations.extend(walk(&b, 7, 0.05, 0.05, 506_000, 444, 6));
    FakeSource::new(vec![a, b, c], observations)
}

#[tokio::test]
async fn test_detection_queries_window_before_anchor() {
    let source = handoff_source();
    let cam_a = Arc::clone(&source.cameras[0]);

    let exits = detect_exit_events(
        &source,
        &cam_a,
        None,
        ANCHOR_MS,
        &DetectionConfig::default(),
        &IsolationConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].id, 1);
    assert!(exits[0].velocity.x > 0.0);
    assert_eq!(
        source.box_queries.lock().unwrap().as_slice(),
        &[("cam-a".to_string(), 370, 600)]
    );
}

#[tokio::test]
async fn test_detection_filters_by_subject() {
    let source = handoff_source();
    let cam_a = Arc::clone(&source.cameras[0]);
    source
        .observations
        .lock()
        .unwrap()
        .extend(walk(&cam_a, 2, 0.5, 0.05, 700_000, 444, 10));

    let all = detect_exit_events(
        &source,
        &cam_a,
        None,
        ANCHOR_MS,
        &DetectionConfig::default(),
        &IsolationConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(all.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);

    let subject = detect_exit_events(
        &source,
        &cam_a,
        Some(2),
        ANCHOR_MS,
        &DetectionConfig::default(),
        &IsolationConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(subject.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2]);
}

#[tokio::test]
async fn test_handoff_between_two_cameras() {
    let source = handoff_source();
    let cameras = source.cameras.clone();
    let isolation = IsolationConfig::default();
    let related = RelatedConfig::default();
    let raster = raster();
    let publisher = PlotPublisher::new(8);
    let mut rx = publisher.subscribe();

    let exits = detect_exit_events(
        &source,
        &cameras[0],
        Some(1),
        ANCHOR_MS,
        &DetectionConfig::default(),
        &isolation,
    )
    .await
    .unwrap();

    let search = RelatedSearch {
        cameras: &cameras,
        related: &related,
        isolation: &isolation,
        raster: &raster,
    };
    let exits = attach_related(&source, exits, search, Some(&publisher)).await.unwrap();

    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].related.len(), 1);
    assert_eq!(exits[0].related[0].id(), 7);

    // Only the camera in the capture net is queried, from the exit's last second.
    let queries = source.box_queries.lock().unwrap().clone();
    assert_eq!(queries[1..], [("cam-b".to_string(), 503, 30)]);

    match rx.try_recv().unwrap() {
        PlotMessage::PlotCameras { cameras, .. } => assert_eq!(cameras.len(), 2),
        other => panic!("unexpected message {}", other.kind()),
    }

    let chains = resolve_chains(exits, &ChainConfig::default());
    assert_eq!(chains.len(), 1);
    let ids: Vec<_> = chains[0].iter().map(|n| n.camera_id().unwrap().to_string()).collect();
    assert_eq!(ids, vec!["cam-a", "cam-b"]);
    assert!(chains[0].end_ms < chains[0].following.as_ref().unwrap().start_ms);

    let root = TempDir::new().unwrap();
    let source = Arc::new(source);
    let combiner = ClipCombiner::new(
        source.clone(),
        Arc::new(FakeConcat::default()),
        combiner_config(root.path()),
    );

    let outcome = combiner.combine(&chains[0], ConnectionType::Lan).await.unwrap();
    let dir = root.path().join("500000");
    assert_eq!(
        outcome,
        CombineOutcome::Stitched {
            output: dir.join(OUTPUT_NAME),
            hops: 2,
            attempts: 1,
        }
    );
    assert_eq!(
        std::fs::read_to_string(dir.join(CONCAT_LIST_NAME)).unwrap(),
        "file '0.mp4'\nfile '1.mp4'\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.join(OUTPUT_NAME)).unwrap(),
        "token-cam-a:496-506;token-cam-b:504-513;"
    );
    assert_eq!(*source.media_calls.lock().unwrap(), vec!["cam-a", "cam-b"]);
}

#[tokio::test]
async fn test_unusable_exit_is_skipped() {
    let source = handoff_source();
    let cameras = source.cameras.clone();
    let (isolation, related, raster) = (IsolationConfig::default(), RelatedConfig::default(), raster());

    let track = Track::new(1, walk(&cameras[0], 1, 0.5, 0.05, 500_000, 444, 3));
    let stuck = ExitEvent::new(1, track, Vector2::ZERO);

    let search = RelatedSearch {
        cameras: &cameras,
        related: &related,
        isolation: &isolation,
        raster: &raster,
    };
    let out = attach_related(&source, vec![stuck], search, None).await.unwrap();
    assert!(out.is_empty());
    assert!(source.box_queries.lock().unwrap().is_empty());
}

async fn single_chain() -> vstitch_models::FinalizedEvent {
    let source = handoff_source();
    let exits = detect_exit_events(
        &source,
        &source.cameras[0],
        Some(1),
        ANCHOR_MS,
        &DetectionConfig::default(),
        &IsolationConfig::default(),
    )
    .await
    .unwrap();
    resolve_chains(exits, &ChainConfig::default()).remove(0)
}

#[tokio::test]
async fn test_existing_directory_is_skipped_without_network() {
    let chain = single_chain().await;
    let root = TempDir::new().unwrap();
    std::fs::create_dir(root.path().join("500000")).unwrap();

    let source = Arc::new(handoff_source());
    let concat = Arc::new(FakeConcat::default());
    let combiner = ClipCombiner::new(source.clone(), concat.clone(), combiner_config(root.path()));

    let outcome = combiner.combine(&chain, ConnectionType::Lan).await.unwrap();
    assert_eq!(
        outcome,
        CombineOutcome::Skipped {
            dir: root.path().join("500000")
        }
    );
    assert_eq!(source.network_calls(), 0);
    assert_eq!(concat.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concat_recovers_after_retry_max_failures() {
    let chain = single_chain().await;
    let root = TempDir::new().unwrap();
    let source = Arc::new(handoff_source());
    let concat = Arc::new(FakeConcat::failing(3));
    let combiner = ClipCombiner::new(source.clone(), concat.clone(), combiner_config(root.path()));

    let outcome = combiner.combine(&chain, ConnectionType::Wan).await.unwrap();

    let output = root.path().join("500000").join(OUTPUT_NAME);
    assert_eq!(
        outcome,
        CombineOutcome::Stitched {
            output: output.clone(),
            hops: 1,
            attempts: 4,
        }
    );
    assert!(output.exists());
    assert_eq!(concat.calls.load(Ordering::SeqCst), 4);
    // Every attempt starts over from a fresh download.
    assert_eq!(source.downloads.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_concat_exhaustion_leaves_no_directory() {
    let chain = single_chain().await;
    let root = TempDir::new().unwrap();
    let source = Arc::new(handoff_source());
    let concat = Arc::new(FakeConcat::broken());
    let combiner = ClipCombiner::new(source.clone(), concat.clone(), combiner_config(root.path()));

    let err = combiner.combine(&chain, ConnectionType::Lan).await.unwrap_err();

    let dir = root.path().join("500000");
    match err {
        WorkerError::ConcatExhausted { attempts, dir: failed } => {
            assert_eq!(attempts, 4);
            assert_eq!(failed, dir);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(concat.calls.load(Ordering::SeqCst), 4);
    assert!(!dir.exists());
}

#[tokio::test]
async fn test_download_failure_propagates_and_cleans_up() {
    let chain = single_chain().await;
    let root = TempDir::new().unwrap();
    let source = Arc::new(handoff_source());
    source.fail_downloads.store(true, Ordering::SeqCst);
    let concat = Arc::new(FakeConcat::default());
    let combiner = ClipCombiner::new(source.clone(), concat.clone(), combiner_config(root.path()));

    let err = combiner.combine(&chain, ConnectionType::Lan).await.unwrap_err();

    assert!(matches!(err, WorkerError::Telemetry(_)));
    assert!(err.is_retryable());
    assert!(!root.path().join("500000").exists());
    assert_eq!(concat.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concurrent_calls_for_one_chain_download_once() {
    let chain = single_chain().await;
    let root = TempDir::new().unwrap();
    let source = Arc::new(handoff_source());
    let concat = Arc::new(FakeConcat::default());
    let combiner = ClipCombiner::new(source.clone(), concat.clone(), combiner_config(root.path()));

    let (a, b) = tokio::join!(
        combiner.combine(&chain, ConnectionType::Lan),
        combiner.combine(&chain, ConnectionType::Lan)
    );

    let outcomes = [a.unwrap(), b.unwrap()];
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| matches!(o, CombineOutcome::Skipped { .. }))
            .count(),
        1
    );
    assert_eq!(source.downloads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_recent_subjects_lists_first_sightings() {
    let source = handoff_source();
    let now_ms = 510_000;

    let subjects = recent_subjects(
        &source,
        &source.cameras,
        now_ms,
        600,
        &IsolationConfig::default(),
        60,
    )
    .await
    .unwrap();

    assert_eq!(subjects.len(), 2);
    assert_eq!((subjects[0].camera_id.as_str(), subjects[0].object_id), ("cam-a", 1));
    assert_eq!(subjects[0].timestamp_ms, 500_000);
    assert_eq!(
        subjects[1].thumbnail_url.as_deref(),
        Some("https://media.test/cam-b/media/frame/cam-b/506000/thumb.jpeg")
    );
    // No thumbnail lookup for a camera with nobody on it.
    assert_eq!(*source.media_calls.lock().unwrap(), vec!["cam-a", "cam-b"]);
}

#[tokio::test]
async fn test_worker_pass_stitches_chain() {
    let root = TempDir::new().unwrap();
    let source = Arc::new(handoff_source());
    let concat = Arc::new(FakeConcat::default());
    let config = WorkerConfig {
        raster: raster(),
        combiner: combiner_config(root.path()),
        camera_id: Some("cam-a".into()),
        object_id: Some(1),
        anchor_time_ms: Some(ANCHOR_MS),
        ..Default::default()
    };
    let worker = StitchWorker::new(config, source.clone(), concat, PlotPublisher::default());

    let cameras = source.cameras.clone();
    let report = worker.run_once(&cameras[0], &cameras, ANCHOR_MS).await.unwrap();

    assert_eq!(report.exits, 1);
    assert_eq!(report.chains.len(), 1);
    assert_eq!(report.chains[0].chain_len(), 2);
    assert_eq!(report.failed, 0);
    assert!(root.path().join("500000").join(OUTPUT_NAME).exists());

    // A second pass over the same window finds the chain already stitched.
    let again = worker.run_once(&cameras[0], &cameras, ANCHOR_MS).await.unwrap();
    assert!(matches!(again.outcomes[..], [CombineOutcome::Skipped { .. }]));
}

#[tokio::test]
async fn test_worker_stops_on_shutdown() {
    let root = TempDir::new().unwrap();
    let source = Arc::new(handoff_source());
    let config = WorkerConfig {
        raster: raster(),
        combiner: combiner_config(root.path()),
        camera_id: Some("cam-a".into()),
        object_id: Some(1),
        anchor_time_ms: Some(ANCHOR_MS),
        ..Default::default()
    };
    let worker = Arc::new(StitchWorker::new(
        config,
        source,
        Arc::new(FakeConcat::default()),
        PlotPublisher::default(),
    ));
    let mut rx = worker.publisher().subscribe();

    let handle = {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move { worker.run().await })
    };

    // The first plot tick announces the followed camera.
    loop {
        if let PlotMessage::CameraId { camera_id } = rx.recv().await.unwrap() {
            assert_eq!(camera_id, "cam-a");
            break;
        }
    }
    worker.shutdown();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_worker_honours_shutdown_requested_before_run() {
    let root = TempDir::new().unwrap();
    let source = Arc::new(handoff_source());
    let config = WorkerConfig {
        raster: raster(),
        combiner: combiner_config(root.path()),
        camera_id: Some("cam-a".into()),
        object_id: Some(1),
        anchor_time_ms: Some(ANCHOR_MS),
        ..Default::default()
    };
    let worker = StitchWorker::new(
        config,
        source.clone(),
        Arc::new(FakeConcat::default()),
        PlotPublisher::default(),
    );

    worker.shutdown();
    tokio::time::timeout(Duration::from_secs(3), worker.run())
        .await
        .expect("worker kept running after shutdown")
        .unwrap();
    assert!(source.box_queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_worker_rejects_unknown_camera() {
    let root = TempDir::new().unwrap();
    let config = WorkerConfig {
        combiner: combiner_config(root.path()),
        camera_id: Some("cam-z".into()),
        object_id: Some(1),
        ..Default::default()
    };
    let worker = StitchWorker::new(
        config,
        Arc::new(handoff_source()),
        Arc::new(FakeConcat::default()),
        PlotPublisher::default(),
    );

    let err = worker.run().await.unwrap_err();
    assert!(matches!(err, WorkerError::CameraNotFound(id) if id == "cam-z"));
}
