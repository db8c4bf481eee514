//! Full-screen zoom/pan viewer.
//!
//! Zoom is expressed against a baseline: the scale at which the whole image
//! fits its container without upscaling. Bounds, the displayed percentage
//! and the pan gate are all relative to that baseline.

use crate::config::{
    DEFAULT_MAX_ZOOM_FACTOR, DEFAULT_MIN_ZOOM_FACTOR, DEFAULT_ZOOM_STEP, DisplayConfig,
};
use crate::error::Result;
use crate::fetch::{FetchedImage, ImageFetcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    Escape,
    ZoomIn,
    ZoomOut,
}

impl ViewerKey {
    /// Maps a key name as reported by the windowing layer.
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "Escape" | "Esc" => Some(ViewerKey::Escape),
            "+" | "=" => Some(ViewerKey::ZoomIn),
            "-" => Some(ViewerKey::ZoomOut),
            _ => None,
        }
    }
}

/// Identifies one open of the viewer; completions carry it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerTicket {
    pub generation: u64,
    pub full_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadCompletion {
    pub generation: u64,
    pub result: Result<FetchedImage>,
}

/// Fetches the full image for `ticket`. Only the header is decoded.
pub async fn load_full(fetcher: &dyn ImageFetcher, ticket: ViewerTicket) -> LoadCompletion {
    let result = fetcher.fetch(&ticket.full_url).await;
    LoadCompletion {
        generation: ticket.generation,
        result,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerFrame {
    Closed,
    /// Full image pending and no thumbnail to show meanwhile
    Loading,
    BlurredThumbnail { url: String },
    Full {
        url: String,
        zoom: f32,
        pan_x: f32,
        pan_y: f32,
    },
    Failed,
}

/// `min(cw / iw, ch / ih, 1)`; degenerate sizes fall back to 1.
pub fn fit_scale(container: (f32, f32), natural: (u32, u32)) -> f32 {
    let (cw, ch) = container;
    let (iw, ih) = natural;
    if iw == 0 || ih == 0 || cw <= 0.0 || ch <= 0.0 {
        return 1.0;
    }
    (cw / iw as f32).min(ch / ih as f32).min(1.0)
}

/// Zoom step and factor bounds from `config`, replacing values that would
/// make the bounds inverted, non-positive or non-finite.
fn zoom_limits(config: &DisplayConfig) -> (f32, f32, f32) {
    let step = if config.zoom_step.is_finite() && config.zoom_step > 1.0 {
        config.zoom_step
    } else {
        log::warn!("Ignoring zoom step {}; using {}", config.zoom_step, DEFAULT_ZOOM_STEP);
        DEFAULT_ZOOM_STEP
    };
    let min = if config.min_zoom_factor.is_finite() && config.min_zoom_factor > 0.0 {
        config.min_zoom_factor
    } else {
        log::warn!(
            "Ignoring minimum zoom factor {}; using {}",
            config.min_zoom_factor,
            DEFAULT_MIN_ZOOM_FACTOR
        );
        DEFAULT_MIN_ZOOM_FACTOR
    };
    let max = if config.max_zoom_factor.is_finite() {
        config.max_zoom_factor
    } else {
        DEFAULT_MAX_ZOOM_FACTOR
    };
    if max < min {
        log::warn!("Maximum zoom factor {} is below minimum {}; raising it", max, min);
    }
    (step, min, max.max(min))
}

#[derive(Debug, Clone)]
pub struct ZoomViewer {
    zoom_step: f32,
    min_factor: f32,
    max_factor: f32,
    container: (f32, f32),

    open: bool,
    generation: u64,
    full_url: String,
    thumbnail_url: Option<String>,
    natural: Option<(u32, u32)>,
    failed: bool,

    zoom: f32,
    baseline: f32,
    pan: (f32, f32),
    drag_anchor: Option<(f32, f32)>,
}

impl ZoomViewer {
    pub fn new(config: &DisplayConfig, container_width: f32, container_height: f32) -> Self {
        let (zoom_step, min_factor, max_factor) = zoom_limits(config);
        Self {
            zoom_step,
            min_factor,
            max_factor,
            container: (container_width, container_height),
            open: false,
            generation: 0,
            full_url: String::new(),
            thumbnail_url: None,
            natural: None,
            failed: false,
            zoom: 1.0,
            baseline: 1.0,
            pan: (0.0, 0.0),
            drag_anchor: None,
        }
    }

    /// Opens on a new image, discarding any state from the previous one.
    pub fn open(&mut self, full_url: impl Into<String>, thumbnail_url: Option<String>) -> ViewerTicket {
        self.generation += 1;
        self.open = true;
        self.full_url = full_url.into();
        self.thumbnail_url = thumbnail_url.filter(|url| !url.is_empty());
        self.natural = None;
        self.failed = false;
        self.zoom = 1.0;
        self.baseline = 1.0;
        self.reset_pan();

        ViewerTicket {
            generation: self.generation,
            full_url: self.full_url.clone(),
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.drag_anchor = None;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_container(&mut self, width: f32, height: f32) {
        self.container = (width, height);
    }

    /// Applies a finished load. Returns false when the completion belongs to
    /// an earlier open or the viewer has been closed since.
    pub fn complete(&mut self, completion: LoadCompletion) -> bool {
        if !self.open || completion.generation != self.generation {
            log::debug!(
                "Dropping viewer load for generation {} (current {})",
                completion.generation,
                self.generation
            );
            return false;
        }

        match completion.result {
            Ok(image) => {
                let natural = (image.width, image.height);
                self.baseline = fit_scale(self.container, natural);
                self.zoom = self.baseline;
                self.natural = Some(natural);
                self.reset_pan();
            }
            Err(error) => {
                log::warn!("Viewer failed to load full image: {}", error);
                self.failed = true;
            }
        }
        true
    }

    pub fn natural_size(&self) -> Option<(u32, u32)> {
        self.natural
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn baseline(&self) -> f32 {
        self.baseline
    }

    pub fn min_zoom(&self) -> f32 {
        self.baseline * self.min_factor
    }

    pub fn max_zoom(&self) -> f32 {
        self.baseline * self.max_factor
    }

    /// Zoom as a whole percentage of the baseline
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom / self.baseline * 100.0).round() as u32
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.set_zoom(self.zoom * self.zoom_step)
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.set_zoom(self.zoom / self.zoom_step)
    }

    fn set_zoom(&mut self, zoom: f32) -> f32 {
        self.zoom = zoom.clamp(self.min_zoom(), self.max_zoom());
        if !self.can_pan() {
            self.reset_pan();
        }
        self.zoom
    }

    pub fn can_pan(&self) -> bool {
        self.zoom > self.baseline
    }

    pub fn pan(&self) -> (f32, f32) {
        self.pan
    }

    pub fn begin_drag(&mut self, x: f32, y: f32) -> bool {
        if !self.open || !self.can_pan() {
            return false;
        }
        self.drag_anchor = Some((x - self.pan.0, y - self.pan.1));
        true
    }

    /// Moves the image with the pointer. Translation is not bounded.
    pub fn drag_to(&mut self, x: f32, y: f32) -> bool {
        match self.drag_anchor {
            Some((ax, ay)) if self.can_pan() => {
                self.pan = (x - ax, y - ay);
                true
            }
            _ => false,
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    fn reset_pan(&mut self) {
        self.pan = (0.0, 0.0);
        self.drag_anchor = None;
    }

    /// Keys are ignored while closed. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: ViewerKey) -> bool {
        if !self.open {
            return false;
        }
        match key {
            ViewerKey::Escape => self.close(),
            ViewerKey::ZoomIn => {
                self.zoom_in();
            }
            ViewerKey::ZoomOut => {
                self.zoom_out();
            }
        }
        true
    }

    pub fn frame(&self) -> ViewerFrame {
        if !self.open {
            return ViewerFrame::Closed;
        }
        if self.failed {
            return ViewerFrame::Failed;
        }
        match (&self.natural, &self.thumbnail_url) {
            (Some(_), _) => ViewerFrame::Full {
                url: self.full_url.clone(),
                zoom: self.zoom,
                pan_x: self.pan.0,
                pan_y: self.pan.1,
            },
            (None, Some(url)) => ViewerFrame::BlurredThumbnail { url: url.clone() },
            (None, None) => ViewerFrame::Loading,
        }
    }
}
