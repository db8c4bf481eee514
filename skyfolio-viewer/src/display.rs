//! Staged loading for a single grid cell.
//!
//! ```text
//! not-requested -> observing -> thumbnail-loading -> thumbnail-ready
//!                            \                            |
//!                             `-------> full-loading <----'
//!                                            |
//!                                        full-ready
//! ```
//!
//! Either loading stage may end in `failed`, which is terminal. The machine
//! is pure: it consumes [`DisplayEvent`]s and answers with at most one
//! [`Effect`] for the caller to carry out.
//!
//! Video cells are never decoded as images. A video with a poster loads the
//! poster through the thumbnail stage and then settles in `full-ready`; one
//! without a poster goes there on viewport entry with no request at all.

use std::fmt;
use std::time::Duration;

use skyfolio_model::{MediaRecord, MediaType};

use crate::config::DisplayConfig;
use crate::error::FetchError;
use crate::fetch::FetchedImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Thumbnail,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadStage {
    NotRequested,
    Observing,
    ThumbnailLoading,
    ThumbnailReady,
    FullLoading,
    FullReady,
    Failed,
}

impl LoadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStage::NotRequested => "not-requested",
            LoadStage::Observing => "observing",
            LoadStage::ThumbnailLoading => "thumbnail-loading",
            LoadStage::ThumbnailReady => "thumbnail-ready",
            LoadStage::FullLoading => "full-loading",
            LoadStage::FullReady => "full-ready",
            LoadStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadStage::FullReady | LoadStage::Failed)
    }

    /// Stages that have not issued any request yet
    pub fn is_idle(&self) -> bool {
        matches!(self, LoadStage::NotRequested | LoadStage::Observing)
    }
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    EnteredViewport,
    PointerEnter,
    PromoteTimerElapsed,
    Loaded { tier: Tier, image: FetchedImage },
    LoadFailed { tier: Tier, error: FetchError },
    Unmounted,
}

/// Work the owner of a [`ProgressiveImage`] must start
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Register the cell with the viewport tracker
    Observe,
    Fetch { tier: Tier, url: String },
    StartPromoteTimer(Duration),
}

/// What a renderer should draw for a cell right now.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderFrame {
    Skeleton,
    /// Thumbnail request in flight, drawn blurred over the skeleton
    BlurredThumbnail { url: String },
    Thumbnail(FetchedImage),
    /// Swapped in with a fade; the thumbnail is gone at this point
    Full(FetchedImage),
    /// Handed to the platform player; `poster` is shown until playback
    Video {
        url: String,
        poster: Option<FetchedImage>,
    },
    Failed,
}

impl RenderFrame {
    pub fn kind(&self) -> &'static str {
        match self {
            RenderFrame::Skeleton => "skeleton",
            RenderFrame::BlurredThumbnail { .. } => "blurred-thumbnail",
            RenderFrame::Thumbnail(_) => "thumbnail",
            RenderFrame::Full(_) => "full",
            RenderFrame::Video { .. } => "video",
            RenderFrame::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressiveImage {
    full_url: String,
    thumbnail_url: Option<String>,
    media_type: MediaType,
    immediate_mode: bool,
    promote_delay: Duration,
    stage: LoadStage,
    thumbnail: Option<FetchedImage>,
    full: Option<FetchedImage>,
    hover_pending: bool,
    unmounted: bool,
    error: Option<FetchError>,
}

impl ProgressiveImage {
    pub fn new(
        full_url: impl Into<String>,
        thumbnail_url: Option<String>,
        config: &DisplayConfig,
    ) -> Self {
        Self {
            full_url: full_url.into(),
            thumbnail_url: thumbnail_url.filter(|url| !url.is_empty()),
            media_type: MediaType::Photo,
            immediate_mode: config.immediate_mode,
            promote_delay: config.promote_delay(),
            stage: LoadStage::NotRequested,
            thumbnail: None,
            full: None,
            hover_pending: false,
            unmounted: false,
            error: None,
        }
    }

    /// Cell for a gallery record, keeping its media type
    pub fn for_record(record: &MediaRecord, config: &DisplayConfig) -> Self {
        Self::new(record.url.clone(), record.thumbnail_url.clone(), config)
            .with_media_type(record.media_type)
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }

    pub fn stage(&self) -> LoadStage {
        self.stage
    }

    pub fn full_url(&self) -> &str {
        &self.full_url
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// Attaches the viewport observer. Only meaningful before the first
    /// viewport entry.
    pub fn observe(&mut self) -> Option<Effect> {
        if self.unmounted || self.stage != LoadStage::NotRequested {
            return None;
        }
        self.stage = LoadStage::Observing;
        Some(Effect::Observe)
    }

    pub fn handle(&mut self, event: DisplayEvent) -> Option<Effect> {
        if self.unmounted {
            log::trace!("Ignoring {:?} after unmount of {}", event, self.full_url);
            return None;
        }

        match (self.stage, event) {
            (_, DisplayEvent::Unmounted) => {
                self.unmounted = true;
                None
            }
            (LoadStage::NotRequested | LoadStage::Observing, DisplayEvent::EnteredViewport) => {
                self.start_loading()
            }
            (LoadStage::ThumbnailLoading, DisplayEvent::PointerEnter) => {
                self.hover_pending = true;
                None
            }
            (LoadStage::ThumbnailReady, DisplayEvent::PointerEnter)
            | (LoadStage::ThumbnailReady, DisplayEvent::PromoteTimerElapsed) => {
                Some(self.promote())
            }
            (
                LoadStage::ThumbnailLoading,
                DisplayEvent::Loaded {
                    tier: Tier::Thumbnail,
                    image,
                },
            ) => {
                self.thumbnail = Some(image);
                if self.is_video() {
                    self.stage = LoadStage::FullReady;
                    return None;
                }
                self.stage = LoadStage::ThumbnailReady;
                if self.hover_pending {
                    Some(self.promote())
                } else if self.immediate_mode {
                    Some(Effect::StartPromoteTimer(self.promote_delay))
                } else {
                    None
                }
            }
            (
                LoadStage::FullLoading,
                DisplayEvent::Loaded {
                    tier: Tier::Full,
                    image,
                },
            ) => {
                self.stage = LoadStage::FullReady;
                self.full = Some(image);
                self.thumbnail = None;
                None
            }
            (LoadStage::ThumbnailLoading, DisplayEvent::LoadFailed { tier: Tier::Thumbnail, error })
                if self.is_video() =>
            {
                log::warn!("Video poster failed to load: {}", error);
                self.stage = LoadStage::FullReady;
                self.error = Some(error);
                None
            }
            (LoadStage::ThumbnailLoading, DisplayEvent::LoadFailed { tier: Tier::Thumbnail, error })
            | (LoadStage::FullLoading, DisplayEvent::LoadFailed { tier: Tier::Full, error }) => {
                log::warn!("Image failed to load: {}", error);
                self.stage = LoadStage::Failed;
                self.thumbnail = None;
                self.error = Some(error);
                None
            }
            (stage, event) => {
                log::trace!("No transition from {} on {:?}", stage, event);
                None
            }
        }
    }

    fn start_loading(&mut self) -> Option<Effect> {
        match &self.thumbnail_url {
            Some(url) => {
                self.stage = LoadStage::ThumbnailLoading;
                Some(Effect::Fetch {
                    tier: Tier::Thumbnail,
                    url: url.clone(),
                })
            }
            None if self.is_video() => {
                self.stage = LoadStage::FullReady;
                None
            }
            None => {
                self.stage = LoadStage::FullLoading;
                Some(Effect::Fetch {
                    tier: Tier::Full,
                    url: self.full_url.clone(),
                })
            }
        }
    }

    fn promote(&mut self) -> Effect {
        self.stage = LoadStage::FullLoading;
        self.hover_pending = false;
        Effect::Fetch {
            tier: Tier::Full,
            url: self.full_url.clone(),
        }
    }

    pub fn frame(&self) -> RenderFrame {
        match self.stage {
            LoadStage::NotRequested | LoadStage::Observing => RenderFrame::Skeleton,
            LoadStage::ThumbnailLoading => RenderFrame::BlurredThumbnail {
                url: self.thumbnail_url.clone().unwrap_or_default(),
            },
            LoadStage::ThumbnailReady | LoadStage::FullLoading => match &self.thumbnail {
                Some(thumbnail) => RenderFrame::Thumbnail(thumbnail.clone()),
                None => RenderFrame::Skeleton,
            },
            LoadStage::FullReady if self.is_video() => RenderFrame::Video {
                url: self.full_url.clone(),
                poster: self.thumbnail.clone(),
            },
            LoadStage::FullReady => match &self.full {
                Some(full) => RenderFrame::Full(full.clone()),
                None => RenderFrame::Failed,
            },
            LoadStage::Failed => RenderFrame::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn image(url: &str) -> FetchedImage {
        FetchedImage {
            url: url.to_string(),
            bytes: Bytes::from_static(b"img"),
            width: 10,
            height: 10,
        }
    }

    fn cell(thumbnail: Option<&str>, immediate_mode: bool) -> ProgressiveImage {
        let config = DisplayConfig::default().with_immediate_mode(immediate_mode);
        ProgressiveImage::new("full.jpg", thumbnail.map(str::to_string), &config)
    }

    fn loaded(tier: Tier, url: &str) -> DisplayEvent {
        DisplayEvent::Loaded {
            tier,
            image: image(url),
        }
    }

    #[test]
    fn immediate_mode_walks_every_stage() {
        let mut cell = cell(Some("thumb.jpg"), true);
        assert_eq!(cell.frame(), RenderFrame::Skeleton);
        assert_eq!(cell.observe(), Some(Effect::Observe));
        assert_eq!(cell.stage(), LoadStage::Observing);
        assert_eq!(cell.frame(), RenderFrame::Skeleton);

        let effect = cell.handle(DisplayEvent::EnteredViewport);
        assert_eq!(
            effect,
            Some(Effect::Fetch {
                tier: Tier::Thumbnail,
                url: "thumb.jpg".into()
            })
        );
        assert_eq!(cell.frame().kind(), "blurred-thumbnail");

        let effect = cell.handle(loaded(Tier::Thumbnail, "thumb.jpg"));
        assert_eq!(
            effect,
            Some(Effect::StartPromoteTimer(Duration::from_millis(1500)))
        );
        assert_eq!(cell.frame(), RenderFrame::Thumbnail(image("thumb.jpg")));

        let effect = cell.handle(DisplayEvent::PromoteTimerElapsed);
        assert_eq!(
            effect,
            Some(Effect::Fetch {
                tier: Tier::Full,
                url: "full.jpg".into()
            })
        );
        // Thumbnail stays up while the full image loads.
        assert_eq!(cell.frame(), RenderFrame::Thumbnail(image("thumb.jpg")));

        assert_eq!(cell.handle(loaded(Tier::Full, "full.jpg")), None);
        assert_eq!(cell.stage(), LoadStage::FullReady);
        assert_eq!(cell.frame(), RenderFrame::Full(image("full.jpg")));
    }

    #[test]
    fn no_thumbnail_goes_straight_to_full() {
        let mut cell = cell(None, true);
        let effect = cell.handle(DisplayEvent::EnteredViewport);
        assert_eq!(
            effect,
            Some(Effect::Fetch {
                tier: Tier::Full,
                url: "full.jpg".into()
            })
        );
        assert_eq!(cell.stage(), LoadStage::FullLoading);
        assert_eq!(cell.frame(), RenderFrame::Skeleton);
    }

    #[test]
    fn empty_thumbnail_url_counts_as_none() {
        let mut cell = cell(Some(""), true);
        cell.handle(DisplayEvent::EnteredViewport);
        assert_eq!(cell.stage(), LoadStage::FullLoading);
    }

    #[test]
    fn interaction_mode_waits_for_hover() {
        let mut cell = cell(Some("thumb.jpg"), false);
        cell.handle(DisplayEvent::EnteredViewport);
        assert_eq!(cell.handle(loaded(Tier::Thumbnail, "thumb.jpg")), None);
        assert_eq!(cell.stage(), LoadStage::ThumbnailReady);

        let effect = cell.handle(DisplayEvent::PointerEnter);
        assert!(matches!(effect, Some(Effect::Fetch { tier: Tier::Full, .. })));
        assert_eq!(cell.stage(), LoadStage::FullLoading);
    }

    #[test]
    fn hover_during_thumbnail_load_is_remembered() {
        let mut cell = cell(Some("thumb.jpg"), false);
        cell.handle(DisplayEvent::EnteredViewport);
        assert_eq!(cell.handle(DisplayEvent::PointerEnter), None);
        assert_eq!(cell.stage(), LoadStage::ThumbnailLoading);

        let effect = cell.handle(loaded(Tier::Thumbnail, "thumb.jpg"));
        assert!(matches!(effect, Some(Effect::Fetch { tier: Tier::Full, .. })));
        assert_eq!(cell.stage(), LoadStage::FullLoading);
    }

    #[test]
    fn late_timer_after_hover_promotion_is_ignored() {
        let mut cell = cell(Some("thumb.jpg"), true);
        cell.handle(DisplayEvent::EnteredViewport);
        cell.handle(loaded(Tier::Thumbnail, "thumb.jpg"));
        cell.handle(DisplayEvent::PointerEnter);
        assert_eq!(cell.handle(DisplayEvent::PromoteTimerElapsed), None);
        assert_eq!(cell.stage(), LoadStage::FullLoading);
    }

    #[test]
    fn fetch_failure_is_terminal() {
        let mut cell = cell(Some("thumb.jpg"), true);
        cell.handle(DisplayEvent::EnteredViewport);
        cell.handle(DisplayEvent::LoadFailed {
            tier: Tier::Thumbnail,
            error: FetchError::Status {
                url: "thumb.jpg".into(),
                status: 404,
            },
        });
        assert_eq!(cell.stage(), LoadStage::Failed);
        assert_eq!(cell.frame(), RenderFrame::Failed);
        assert!(cell.error().is_some());

        assert_eq!(cell.handle(DisplayEvent::PointerEnter), None);
        assert_eq!(cell.handle(loaded(Tier::Thumbnail, "thumb.jpg")), None);
        assert_eq!(cell.stage(), LoadStage::Failed);
    }

    #[test]
    fn full_failure_replaces_thumbnail() {
        let mut cell = cell(Some("thumb.jpg"), true);
        cell.handle(DisplayEvent::EnteredViewport);
        cell.handle(loaded(Tier::Thumbnail, "thumb.jpg"));
        cell.handle(DisplayEvent::PromoteTimerElapsed);
        cell.handle(DisplayEvent::LoadFailed {
            tier: Tier::Full,
            error: FetchError::Timeout {
                url: "full.jpg".into(),
            },
        });
        assert_eq!(cell.frame(), RenderFrame::Failed);
    }

    #[test]
    fn events_after_unmount_are_ignored() {
        let mut cell = cell(Some("thumb.jpg"), true);
        cell.handle(DisplayEvent::EnteredViewport);
        cell.handle(DisplayEvent::Unmounted);
        assert!(cell.is_unmounted());

        assert_eq!(cell.handle(loaded(Tier::Thumbnail, "thumb.jpg")), None);
        assert_eq!(cell.stage(), LoadStage::ThumbnailLoading);
        assert_eq!(cell.observe(), None);
    }

    fn video(poster: Option<&str>) -> ProgressiveImage {
        ProgressiveImage::new(
            "clip.mp4",
            poster.map(str::to_string),
            &DisplayConfig::default(),
        )
        .with_media_type(MediaType::Video)
    }

    #[test]
    fn video_without_poster_is_ready_without_a_request() {
        let mut cell = video(None);
        cell.observe();
        assert_eq!(cell.handle(DisplayEvent::EnteredViewport), None);
        assert_eq!(cell.stage(), LoadStage::FullReady);
        assert_eq!(
            cell.frame(),
            RenderFrame::Video {
                url: "clip.mp4".into(),
                poster: None
            }
        );
    }

    #[test]
    fn video_poster_loads_without_promotion() {
        let mut cell = video(Some("poster.jpg"));
        let effect = cell.handle(DisplayEvent::EnteredViewport);
        assert_eq!(
            effect,
            Some(Effect::Fetch {
                tier: Tier::Thumbnail,
                url: "poster.jpg".into()
            })
        );
        assert_eq!(cell.handle(loaded(Tier::Thumbnail, "poster.jpg")), None);
        assert_eq!(cell.stage(), LoadStage::FullReady);
        assert_eq!(
            cell.frame(),
            RenderFrame::Video {
                url: "clip.mp4".into(),
                poster: Some(image("poster.jpg"))
            }
        );
        assert_eq!(cell.handle(DisplayEvent::PointerEnter), None);
    }

    #[test]
    fn broken_video_poster_still_plays() {
        let mut cell = video(Some("poster.jpg"));
        cell.handle(DisplayEvent::EnteredViewport);
        cell.handle(DisplayEvent::LoadFailed {
            tier: Tier::Thumbnail,
            error: FetchError::Status {
                url: "poster.jpg".into(),
                status: 404,
            },
        });
        assert_eq!(cell.stage(), LoadStage::FullReady);
        assert_eq!(cell.frame().kind(), "video");
        assert!(cell.error().is_some());
    }

    #[test]
    fn second_viewport_entry_does_nothing() {
        let mut cell = cell(Some("thumb.jpg"), true);
        assert!(cell.handle(DisplayEvent::EnteredViewport).is_some());
        assert_eq!(cell.handle(DisplayEvent::EnteredViewport), None);
    }
}
