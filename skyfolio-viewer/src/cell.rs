//! Async driver for one [`ProgressiveImage`].
//!
//! The driver owns the state machine, turns UI input into events, runs the
//! fetches and the promote timer it asks for, and publishes a frame whenever
//! what should be drawn changes. Cancelling the token is the unmount: every
//! task spawned on the cell's behalf stops, and nothing reaches the state
//! machine afterwards.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::display::{DisplayEvent, Effect, ProgressiveImage, RenderFrame};
use crate::error::FetchError;
use crate::fetch::ImageFetcher;

/// UI signals a cell reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellInput {
    EnteredViewport,
    PointerEnter,
}

impl From<CellInput> for DisplayEvent {
    fn from(input: CellInput) -> Self {
        match input {
            CellInput::EnteredViewport => DisplayEvent::EnteredViewport,
            CellInput::PointerEnter => DisplayEvent::PointerEnter,
        }
    }
}

/// Runs `image` until it reaches a terminal stage or `token` is cancelled,
/// and hands the state machine back.
///
/// Frames are only sent when they differ from the previous one, so a
/// renderer never sees a redundant repaint or a gap between two contents.
pub async fn run_cell(
    mut image: ProgressiveImage,
    fetcher: Arc<dyn ImageFetcher>,
    fetch_timeout: Duration,
    token: CancellationToken,
    mut inputs: mpsc::Receiver<CellInput>,
    frames: mpsc::UnboundedSender<RenderFrame>,
) -> ProgressiveImage {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<DisplayEvent>();
    let mut last = image.frame();
    let _ = frames.send(last.clone());
    image.observe();

    let mut inputs_open = true;
    while !image.stage().is_terminal() {
        let event = tokio::select! {
            biased;
            _ = token.cancelled() => DisplayEvent::Unmounted,
            Some(event) = events_rx.recv() => event,
            input = inputs.recv(), if inputs_open => match input {
                Some(input) => input.into(),
                None => {
                    inputs_open = false;
                    continue;
                }
            },
        };

        if event == DisplayEvent::Unmounted {
            image.handle(event);
            log::debug!("Cell {} unmounted in {}", image.full_url(), image.stage());
            break;
        }

        if let Some(effect) = image.handle(event) {
            spawn_effect(effect, &fetcher, fetch_timeout, &token, &events_tx);
        }

        let frame = image.frame();
        if frame != last {
            let _ = frames.send(frame.clone());
            last = frame;
        }
    }

    image
}

fn spawn_effect(
    effect: Effect,
    fetcher: &Arc<dyn ImageFetcher>,
    fetch_timeout: Duration,
    token: &CancellationToken,
    events: &mpsc::UnboundedSender<DisplayEvent>,
) {
    let token = token.clone();
    let events = events.clone();

    match effect {
        Effect::Observe => {}
        Effect::Fetch { tier, url } => {
            let fetcher = Arc::clone(fetcher);
            tokio::spawn(async move {
                let outcome = tokio::select! {
                    _ = token.cancelled() => return,
                    outcome = tokio::time::timeout(fetch_timeout, fetcher.fetch(&url)) => outcome,
                };
                let event = match outcome {
                    Ok(Ok(image)) => DisplayEvent::Loaded { tier, image },
                    Ok(Err(error)) => DisplayEvent::LoadFailed { tier, error },
                    Err(_) => DisplayEvent::LoadFailed {
                        tier,
                        error: FetchError::Timeout { url },
                    },
                };
                let _ = events.send(event);
            });
        }
        Effect::StartPromoteTimer(delay) => {
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(delay) => {
                        let _ = events.send(DisplayEvent::PromoteTimerElapsed);
                    }
                }
            });
        }
    }
}
