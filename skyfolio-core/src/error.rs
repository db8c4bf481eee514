use std::fmt;

use skyfolio_model::MediaId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbnailError {
    /// Source could not be read, decoded, resized or encoded
    #[error("Thumbnail processing failed: {0}")]
    Processing(String),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid thumbnail request: {0}")]
    InvalidOptions(String),
}

impl ThumbnailError {
    pub(crate) fn fetch(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        ThumbnailError::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<image::ImageError> for ThumbnailError {
    fn from(err: image::ImageError) -> Self {
        ThumbnailError::Processing(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ThumbnailError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Media record not found: {0}")]
    NotFound(MediaId),

    #[error("Media record already exists: {0}")]
    Conflict(MediaId),

    #[error("Record store unavailable: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Ordered steps of an upload. Cancellation is checked before each one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadStage {
    Validate,
    StoreOriginal,
    GenerateVariants,
    PersistRecord,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStage::Validate => "validate",
            UploadStage::StoreOriginal => "store-original",
            UploadStage::GenerateVariants => "generate-variants",
            UploadStage::PersistRecord => "persist-record",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum UploadFailure {
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Thumbnail(#[from] ThumbnailError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("upload cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
#[error("upload failed during {stage}: {source}")]
pub struct UploadError {
    pub stage: UploadStage,
    pub source: UploadFailure,
}

impl UploadError {
    pub fn new(stage: UploadStage, source: impl Into<UploadFailure>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    pub fn rejected(stage: UploadStage, reason: impl Into<String>) -> Self {
        Self::new(stage, UploadFailure::Rejected(reason.into()))
    }

    pub fn cancelled(stage: UploadStage) -> Self {
        Self::new(stage, UploadFailure::Cancelled)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.source, UploadFailure::Cancelled)
    }
}
