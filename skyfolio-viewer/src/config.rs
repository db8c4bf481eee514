use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 12;
pub const DEFAULT_LOAD_MORE_DELAY_MS: u64 = 100;
pub const DEFAULT_PROMOTE_DELAY_MS: u64 = 1_500;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ZOOM_STEP: f32 = 1.5;
pub const DEFAULT_MIN_ZOOM_FACTOR: f32 = 0.2;
pub const DEFAULT_MAX_ZOOM_FACTOR: f32 = 5.0;

/// Client display tuning. Every field has a default, so a partial document
/// (or none at all) deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Items rendered per page of the grid
    pub page_size: usize,
    /// How long the grid keeps its loading flag up after a load-more
    pub load_more_delay_ms: u64,
    /// Delay between thumbnail-ready and fetching the full image when
    /// `immediate_mode` is on
    pub promote_delay_ms: u64,
    /// Promote to full resolution on a timer instead of waiting for hover
    pub immediate_mode: bool,
    pub fetch_timeout_secs: u64,
    pub zoom_step: f32,
    /// Zoom bounds, as multiples of the fit-to-container baseline
    pub min_zoom_factor: f32,
    pub max_zoom_factor: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            load_more_delay_ms: DEFAULT_LOAD_MORE_DELAY_MS,
            promote_delay_ms: DEFAULT_PROMOTE_DELAY_MS,
            immediate_mode: true,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            zoom_step: DEFAULT_ZOOM_STEP,
            min_zoom_factor: DEFAULT_MIN_ZOOM_FACTOR,
            max_zoom_factor: DEFAULT_MAX_ZOOM_FACTOR,
        }
    }
}

impl DisplayConfig {
    pub fn load_more_delay(&self) -> Duration {
        Duration::from_millis(self.load_more_delay_ms)
    }

    pub fn promote_delay(&self) -> Duration {
        Duration::from_millis(self.promote_delay_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Page size, never below one
    pub fn effective_page_size(&self) -> usize {
        self.page_size.max(1)
    }

    pub fn with_immediate_mode(mut self, immediate_mode: bool) -> Self {
        self.immediate_mode = immediate_mode;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}
