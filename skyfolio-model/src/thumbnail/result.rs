use std::path::PathBuf;

use super::TierName;

/// A written rendition. Immutable once returned; removed only by an explicit
/// delete.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ThumbnailResult {
    pub path: PathBuf,
    pub url: String,
    pub byte_size: u64,
}

impl ThumbnailResult {
    /// Final path segment of the file on disk
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierFailure {
    pub tier: TierName,
    pub message: String,
}

/// Outcome of a multi-tier generation. A tier that failed is `None` and has a
/// matching entry in `failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThumbnailSet {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub small: Option<ThumbnailResult>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub medium: Option<ThumbnailResult>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub large: Option<ThumbnailResult>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub failed: Vec<TierFailure>,
}

impl ThumbnailSet {
    pub fn get(&self, tier: TierName) -> Option<&ThumbnailResult> {
        match tier {
            TierName::Small => self.small.as_ref(),
            TierName::Medium => self.medium.as_ref(),
            TierName::Large => self.large.as_ref(),
        }
    }

    pub fn set(&mut self, tier: TierName, result: ThumbnailResult) {
        let slot = match tier {
            TierName::Small => &mut self.small,
            TierName::Medium => &mut self.medium,
            TierName::Large => &mut self.large,
        };
        *slot = Some(result);
    }

    pub fn record_failure(&mut self, tier: TierName, message: impl Into<String>) {
        self.failed.push(TierFailure {
            tier,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.small.is_none() && self.medium.is_none() && self.large.is_none()
    }

    /// Successful renditions, smallest first
    pub fn iter(&self) -> impl Iterator<Item = (TierName, &ThumbnailResult)> {
        [
            (TierName::Small, self.small.as_ref()),
            (TierName::Medium, self.medium.as_ref()),
            (TierName::Large, self.large.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, result)| result.map(|r| (name, r)))
    }

    pub fn urls(&self) -> Vec<String> {
        self.iter().map(|(_, r)| r.url.clone()).collect()
    }

    /// The URL a display cell should use as its placeholder
    pub fn preview_url(&self) -> Option<&str> {
        self.small.as_ref().map(|r| r.url.as_str())
    }
}
