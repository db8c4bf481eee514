use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const DEFAULT_THUMBNAIL_ROUTE: &str = "thumbnails";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a [`ThumbnailGenerator`](super::ThumbnailGenerator) needs to
/// know about its environment.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Served directory the renditions are written into
    pub thumbnail_dir: PathBuf,
    /// Scratch space for downloaded sources; system temp dir when `None`
    pub temp_dir: Option<PathBuf>,
    /// Used to build returned URLs and to resolve relative source URLs
    pub public_base_url: Url,
    pub thumbnail_route: String,
    pub fetch_timeout: Duration,
}

impl GeneratorConfig {
    pub fn new(thumbnail_dir: impl Into<PathBuf>, public_base_url: Url) -> Self {
        Self {
            thumbnail_dir: thumbnail_dir.into(),
            temp_dir: None,
            public_base_url,
            thumbnail_route: DEFAULT_THUMBNAIL_ROUTE.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(temp_dir.into());
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn resolved_temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
