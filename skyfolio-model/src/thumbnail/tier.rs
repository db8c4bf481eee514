use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use super::{OutputFormat, ThumbnailOptions};
use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TierName {
    Small,
    Medium,
    Large,
}

impl TierName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierName::Small => "small",
            TierName::Medium => "medium",
            TierName::Large => "large",
        }
    }
}

impl Display for TierName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(TierName::Small),
            "medium" => Ok(TierName::Medium),
            "large" => Ok(TierName::Large),
            other => Err(ModelError::UnknownTier(other.to_string())),
        }
    }
}

/// A named rendition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThumbnailTier {
    pub name: TierName,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub options: ThumbnailOptions,
}

impl ThumbnailTier {
    pub fn new(name: TierName, options: ThumbnailOptions) -> Self {
        Self { name, options }
    }

    /// small 150x150 q60, medium 400x300 q80, large 800x600 q85
    pub fn defaults() -> Vec<ThumbnailTier> {
        Self::defaults_in(OutputFormat::Jpeg)
    }

    pub fn defaults_in(format: OutputFormat) -> Vec<ThumbnailTier> {
        vec![
            ThumbnailTier::new(
                TierName::Small,
                ThumbnailOptions::new(150, 150)
                    .with_quality(60)
                    .with_format(format),
            ),
            ThumbnailTier::new(
                TierName::Medium,
                ThumbnailOptions::new(400, 300)
                    .with_quality(80)
                    .with_format(format),
            ),
            ThumbnailTier::new(
                TierName::Large,
                ThumbnailOptions::new(800, 600)
                    .with_quality(85)
                    .with_format(format),
            ),
        ]
    }
}
