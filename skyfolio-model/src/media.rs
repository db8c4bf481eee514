use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::ModelError;
use crate::ids::MediaId;

/// Kind of asset a record points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MediaType {
    Photo,
    Video,
}

impl MediaType {
    /// Classify a MIME type; anything outside `image/*` and `video/*` is
    /// rejected.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        if essence.starts_with("image/") {
            Some(MediaType::Photo)
        } else if essence.starts_with("video/") {
            Some(MediaType::Video)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Photo => "photo",
            MediaType::Video => "video",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "photo" | "image" => Ok(MediaType::Photo),
            "video" => Ok(MediaType::Video),
            other => Err(ModelError::UnknownMediaType(other.to_string())),
        }
    }
}

/// Where the original bytes came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MediaSource {
    #[default]
    Upload,
    Remote,
}

/// A persisted media entry.
///
/// The display side only ever reads `url`, `thumbnail_url` and `media_type`.
/// `variants` lists every generated rendition so that deleting the record
/// can remove all of them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MediaRecord {
    pub id: MediaId,
    pub title: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub location: Option<String>,
    pub media_type: MediaType,
    pub url: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub thumbnail_url: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub variants: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub source: MediaSource,
    pub created_at: DateTime<Utc>,
}

impl MediaRecord {
    pub fn new(
        title: impl Into<String>,
        media_type: MediaType,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: MediaId::new(),
            title: title.into(),
            location: None,
            media_type,
            url: url.into(),
            thumbnail_url: None,
            variants: Vec::new(),
            source: MediaSource::Upload,
            created_at: Utc::now(),
        }
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    pub fn with_thumbnail(mut self, thumbnail_url: Option<String>) -> Self {
        self.thumbnail_url = thumbnail_url;
        self
    }

    pub fn with_variants(mut self, variants: Vec<String>) -> Self {
        self.variants = variants;
        self
    }

    pub fn with_source(mut self, source: MediaSource) -> Self {
        self.source = source;
        self
    }

    /// Every URL owned by this record: the original plus each variant.
    pub fn owned_urls(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.url.as_str())
            .chain(self.variants.iter().map(String::as_str))
    }
}
