use std::path::PathBuf;

use bytes::Bytes;

/// Where a generation reads its source image from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailSource {
    Buffer(Bytes),
    Path(PathBuf),
    /// Absolute http(s) URL or a path relative to the public base URL
    Url(String),
}

impl ThumbnailSource {
    /// Classify a caller supplied location: http(s) URLs are fetched,
    /// anything else is a local file path.
    pub fn from_location(location: &str) -> Self {
        if looks_like_http_url(location) {
            ThumbnailSource::Url(location.to_string())
        } else {
            ThumbnailSource::Path(PathBuf::from(location))
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ThumbnailSource::Buffer(_) => "buffer",
            ThumbnailSource::Path(_) => "path",
            ThumbnailSource::Url(_) => "url",
        }
    }
}

impl From<Bytes> for ThumbnailSource {
    fn from(bytes: Bytes) -> Self {
        ThumbnailSource::Buffer(bytes)
    }
}

impl From<Vec<u8>> for ThumbnailSource {
    fn from(bytes: Vec<u8>) -> Self {
        ThumbnailSource::Buffer(Bytes::from(bytes))
    }
}

impl From<&str> for ThumbnailSource {
    fn from(location: &str) -> Self {
        ThumbnailSource::from_location(location)
    }
}

impl From<String> for ThumbnailSource {
    fn from(location: String) -> Self {
        ThumbnailSource::from_location(&location)
    }
}

pub fn looks_like_http_url(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
