//! # Skyfolio Core
//!
//! Server-side half of the progressive image pipeline.
//!
//! - [`infra::media::thumbnail`]: cover-fit thumbnail generation from bytes,
//!   files or remote URLs, in named size tiers
//! - [`database`]: the media record store port and an in-memory adapter
//! - [`application`]: the staged upload pipeline and the media library
//!   service that keeps records and their files in step
//!
//! Everything is constructed from explicit configuration; there are no
//! process-wide singletons.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod application;
pub mod database;
pub mod error;
pub mod infra;

pub use application::library::{DeleteReport, MediaLibrary};
pub use application::upload::{UploadOutcome, UploadPipeline, UploadRequest};
pub use database::ports::media_records::MediaRecordStore;
pub use database::memory::InMemoryMediaStore;
pub use error::{
    Result, StoreError, StoreResult, ThumbnailError, UploadError,
    UploadFailure, UploadStage,
};
pub use infra::media::public_dir::PublicDir;
pub use infra::media::thumbnail::{
    GeneratorConfig, ThumbnailGenerator, ThumbnailSource,
};
