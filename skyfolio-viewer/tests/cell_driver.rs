mod common;

use std::sync::Arc;
use std::time::Duration;

use common::ScriptedFetcher;
use skyfolio_model::{MediaRecord, MediaType};
use skyfolio_viewer::{
    CellInput, DisplayConfig, FetchError, LoadStage, ProgressiveImage, RenderFrame, run_cell,
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const THUMB: &str = "http://cdn/thumbnails/a.jpg";
const FULL: &str = "http://cdn/uploads/a.jpg";

struct Harness {
    inputs: mpsc::Sender<CellInput>,
    frames: mpsc::UnboundedReceiver<RenderFrame>,
    token: CancellationToken,
    task: tokio::task::JoinHandle<ProgressiveImage>,
}

fn start(fetcher: Arc<ScriptedFetcher>, config: DisplayConfig, thumbnail: Option<&str>) -> Harness {
    let image = ProgressiveImage::new(FULL, thumbnail.map(str::to_string), &config);
    start_with(fetcher, config, image)
}

fn start_with(
    fetcher: Arc<ScriptedFetcher>,
    config: DisplayConfig,
    image: ProgressiveImage,
) -> Harness {
    let token = CancellationToken::new();
    let (inputs, inputs_rx) = mpsc::channel(8);
    let (frames_tx, frames) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_cell(
        image,
        fetcher,
        config.fetch_timeout(),
        token.clone(),
        inputs_rx,
        frames_tx,
    ));
    Harness {
        inputs,
        frames,
        token,
        task,
    }
}

fn drain(frames: &mut mpsc::UnboundedReceiver<RenderFrame>) -> Vec<&'static str> {
    let mut kinds = Vec::new();
    while let Ok(frame) = frames.try_recv() {
        kinds.push(frame.kind());
    }
    kinds
}

#[tokio::test(start_paused = true)]
async fn skeleton_then_thumbnail_then_full() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .ok(THUMB, Duration::from_millis(200))
            .ok(FULL, Duration::from_millis(500)),
    );
    let mut harness = start(fetcher.clone(), DisplayConfig::default(), Some(THUMB));
    let started = Instant::now();

    harness
        .inputs
        .send(CellInput::EnteredViewport)
        .await
        .expect("send");
    let image = harness.task.await.expect("cell task");

    assert_eq!(image.stage(), LoadStage::FullReady);
    assert_eq!(
        drain(&mut harness.frames),
        vec!["skeleton", "blurred-thumbnail", "thumbnail", "full"]
    );
    assert_eq!(fetcher.calls(), vec![THUMB.to_string(), FULL.to_string()]);
    // Thumbnail, promote delay, then the full image.
    assert!(started.elapsed() >= Duration::from_millis(2200));
}

#[tokio::test(start_paused = true)]
async fn without_thumbnail_full_follows_skeleton() {
    let fetcher = Arc::new(ScriptedFetcher::new().ok(FULL, Duration::from_millis(300)));
    let mut harness = start(fetcher.clone(), DisplayConfig::default(), None);

    harness
        .inputs
        .send(CellInput::EnteredViewport)
        .await
        .expect("send");
    let image = harness.task.await.expect("cell task");

    assert_eq!(image.stage(), LoadStage::FullReady);
    assert_eq!(drain(&mut harness.frames), vec!["skeleton", "full"]);
    assert_eq!(fetcher.calls(), vec![FULL.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn hover_while_thumbnail_loads_skips_the_timer() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .ok(THUMB, Duration::from_millis(200))
            .ok(FULL, Duration::from_millis(200)),
    );
    let config = DisplayConfig::default().with_immediate_mode(false);
    let mut harness = start(fetcher, config, Some(THUMB));
    let started = Instant::now();

    harness
        .inputs
        .send(CellInput::EnteredViewport)
        .await
        .expect("send");
    harness
        .inputs
        .send(CellInput::PointerEnter)
        .await
        .expect("send");
    let image = harness.task.await.expect("cell task");

    assert_eq!(image.stage(), LoadStage::FullReady);
    assert!(started.elapsed() < Duration::from_millis(1500));
    assert_eq!(
        drain(&mut harness.frames),
        vec!["skeleton", "blurred-thumbnail", "thumbnail", "full"]
    );
}

#[tokio::test(start_paused = true)]
async fn unmount_mid_fetch_drops_the_late_result() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .ok(THUMB, Duration::from_secs(1))
            .ok(FULL, Duration::from_millis(10)),
    );
    let mut harness = start(fetcher.clone(), DisplayConfig::default(), Some(THUMB));

    harness
        .inputs
        .send(CellInput::EnteredViewport)
        .await
        .expect("send");
    tokio::time::sleep(Duration::from_millis(500)).await;
    harness.token.cancel();

    let image = harness.task.await.expect("cell task");
    assert!(image.is_unmounted());
    assert_eq!(image.stage(), LoadStage::ThumbnailLoading);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(
        drain(&mut harness.frames),
        vec!["skeleton", "blurred-thumbnail"]
    );
    assert_eq!(fetcher.calls(), vec![THUMB.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn stalled_fetch_times_out_into_failed() {
    // No route for the thumbnail: the request never answers.
    let fetcher = Arc::new(ScriptedFetcher::new());
    let mut harness = start(fetcher, DisplayConfig::default(), Some(THUMB));
    let started = Instant::now();

    harness
        .inputs
        .send(CellInput::EnteredViewport)
        .await
        .expect("send");
    let image = harness.task.await.expect("cell task");

    assert_eq!(image.stage(), LoadStage::Failed);
    assert!(matches!(image.error(), Some(FetchError::Timeout { .. })));
    assert!(started.elapsed() >= Duration::from_secs(30));
    assert_eq!(
        drain(&mut harness.frames),
        vec!["skeleton", "blurred-thumbnail", "failed"]
    );
}

#[tokio::test(start_paused = true)]
async fn failed_thumbnail_never_requests_full() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .fail(THUMB, Duration::from_millis(50), 404)
            .ok(FULL, Duration::from_millis(50)),
    );
    let mut harness = start(fetcher.clone(), DisplayConfig::default(), Some(THUMB));

    harness
        .inputs
        .send(CellInput::EnteredViewport)
        .await
        .expect("send");
    let image = harness.task.await.expect("cell task");

    assert_eq!(image.stage(), LoadStage::Failed);
    assert_eq!(drain(&mut harness.frames).last(), Some(&"failed"));
    assert_eq!(fetcher.calls(), vec![THUMB.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn video_without_poster_never_fetches() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    let config = DisplayConfig::default();
    let clip = MediaRecord::new("Clip", MediaType::Video, "http://cdn/uploads/clip.mp4");
    let mut harness = start_with(
        fetcher.clone(),
        config.clone(),
        ProgressiveImage::for_record(&clip, &config),
    );

    harness
        .inputs
        .send(CellInput::EnteredViewport)
        .await
        .expect("send");
    let image = harness.task.await.expect("cell task");

    assert_eq!(image.stage(), LoadStage::FullReady);
    assert!(image.error().is_none());
    assert_eq!(drain(&mut harness.frames), vec!["skeleton", "video"]);
    assert!(fetcher.calls().is_empty());
}
