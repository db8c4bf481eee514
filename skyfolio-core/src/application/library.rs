//! Read and delete access to media records, keeping the files on disk in
//! step with the records that reference them.

use std::sync::Arc;

use skyfolio_model::{MediaId, MediaRecord, MediaType};
use tracing::{info, warn};

use crate::database::ports::media_records::MediaRecordStore;
use crate::error::{StoreError, StoreResult};
use crate::infra::media::public_dir::PublicDir;
use crate::infra::media::thumbnail::ThumbnailGenerator;

/// What a delete removed from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteReport {
    pub record: MediaRecord,
    pub files_removed: usize,
    pub files_missing: usize,
    /// URLs that could not be removed (foreign host, IO failure)
    pub files_failed: Vec<String>,
}

#[derive(Clone)]
pub struct MediaLibrary {
    store: Arc<dyn MediaRecordStore>,
    generator: ThumbnailGenerator,
    originals: PublicDir,
}

impl std::fmt::Debug for MediaLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaLibrary")
            .field("generator", &self.generator)
            .field("originals", &self.originals)
            .finish_non_exhaustive()
    }
}

impl MediaLibrary {
    pub fn new(
        store: Arc<dyn MediaRecordStore>,
        generator: ThumbnailGenerator,
        originals: PublicDir,
    ) -> Self {
        Self {
            store,
            generator,
            originals,
        }
    }

    pub async fn list(
        &self,
        media_type: Option<MediaType>,
    ) -> StoreResult<Vec<MediaRecord>> {
        self.store.list(media_type).await
    }

    pub async fn get(&self, id: MediaId) -> StoreResult<MediaRecord> {
        self.store.get(id).await?.ok_or(StoreError::NotFound(id))
    }

    /// Remove the record, every rendition listed on it and the stored
    /// original. File failures are reported, not raised: once the record is
    /// gone nothing can reference the files again.
    pub async fn delete(&self, id: MediaId) -> StoreResult<DeleteReport> {
        let record = self.store.remove(id).await?.ok_or(StoreError::NotFound(id))?;

        let mut report = DeleteReport {
            record,
            files_removed: 0,
            files_missing: 0,
            files_failed: Vec::new(),
        };

        let mut urls: Vec<String> =
            report.record.owned_urls().map(str::to_string).collect();
        if let Some(thumb) = &report.record.thumbnail_url
            && !urls.contains(thumb)
        {
            urls.push(thumb.clone());
        }

        for url in urls {
            let outcome = if self.generator.output_dir().owns_url(&url) {
                self.generator.delete_variant(&url).await
            } else if self.originals.owns_url(&url) {
                self.originals.remove_by_url(&url).await
            } else {
                warn!(%id, url, "skipping file outside served directories");
                report.files_failed.push(url);
                continue;
            };

            match outcome {
                Ok(true) => report.files_removed += 1,
                Ok(false) => report.files_missing += 1,
                Err(err) => {
                    warn!(%id, url, "failed to remove media file: {err}");
                    report.files_failed.push(url);
                }
            }
        }

        info!(
            %id,
            removed = report.files_removed,
            missing = report.files_missing,
            failed = report.files_failed.len(),
            "media record deleted"
        );
        Ok(report)
    }
}
