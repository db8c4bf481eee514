//! Thumbnail tiers, encode options and generation results.

pub mod format;
pub mod options;
pub mod result;
pub mod tier;

pub use format::OutputFormat;
pub use options::ThumbnailOptions;
pub use result::{ThumbnailResult, ThumbnailSet, TierFailure};
pub use tier::{ThumbnailTier, TierName};
