//! Core data model definitions shared across Skyfolio crates.
#![allow(missing_docs)]

pub mod error;
pub mod ids;
pub mod media;
pub mod thumbnail;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use ids::MediaId;
pub use media::{MediaRecord, MediaSource, MediaType};
pub use thumbnail::{
    OutputFormat, ThumbnailOptions, ThumbnailResult, ThumbnailSet,
    ThumbnailTier, TierFailure, TierName,
};
