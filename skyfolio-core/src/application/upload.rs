//! Staged upload pipeline: validate, store the original, generate renditions,
//! persist the record.
//!
//! Each stage is a cancellation point. When a stage fails, or the token is
//! cancelled between stages, every file the upload already wrote is removed
//! before the error is returned.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use skyfolio_model::{
    MediaRecord, MediaSource, MediaType, ThumbnailSet, ThumbnailTier, TierName,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::database::ports::media_records::MediaRecordStore;
use crate::error::{UploadError, UploadStage};
use crate::infra::media::image_validation::{
    extension_for, sniff_video, validate_magic_bytes,
};
use crate::infra::media::public_dir::PublicDir;
use crate::infra::media::thumbnail::{ThumbnailGenerator, ThumbnailSource};

/// Raw upload as received from the transport.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub bytes: Bytes,
    /// Declared MIME type; the sniffed type wins when they disagree
    pub content_type: Option<String>,
    pub filename: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub record: MediaRecord,
    pub thumbnails: ThumbnailSet,
}

#[derive(Clone)]
pub struct UploadPipeline {
    store: Arc<dyn MediaRecordStore>,
    generator: ThumbnailGenerator,
    originals: PublicDir,
    tiers: Vec<ThumbnailTier>,
}

impl std::fmt::Debug for UploadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadPipeline")
            .field("originals", &self.originals)
            .field("tiers", &self.tiers)
            .finish_non_exhaustive()
    }
}

struct Validated {
    media_type: MediaType,
    content_type: &'static str,
    title: String,
}

/// Files written so far. Removed by [`WrittenFiles::discard`] when a stage
/// fails; if the upload future is dropped mid-flight, removal is handed to
/// the runtime instead.
#[derive(Default)]
struct WrittenFiles {
    paths: Vec<PathBuf>,
}

impl WrittenFiles {
    fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    fn extend_from_set(&mut self, set: &ThumbnailSet) {
        self.paths.extend(set.iter().map(|(_, r)| r.path.clone()));
    }

    fn commit(mut self) {
        self.paths.clear();
    }

    async fn discard(mut self) {
        remove_files(std::mem::take(&mut self.paths)).await;
    }
}

impl Drop for WrittenFiles {
    fn drop(&mut self) {
        if self.paths.is_empty() {
            return;
        }
        let paths = std::mem::take(&mut self.paths);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(remove_files(paths));
            }
            Err(_) => warn!(
                files = paths.len(),
                "no runtime to clean up an aborted upload"
            ),
        }
    }
}

async fn remove_files(paths: Vec<PathBuf>) {
    for path in paths {
        if let Err(err) = tokio::fs::remove_file(&path).await
            && err.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %path.display(), "failed to clean up aborted upload: {err}");
        }
    }
}

impl UploadPipeline {
    pub fn new(
        store: Arc<dyn MediaRecordStore>,
        generator: ThumbnailGenerator,
        originals: PublicDir,
    ) -> Self {
        Self {
            store,
            generator,
            originals,
            tiers: ThumbnailTier::defaults(),
        }
    }

    pub fn with_tiers(mut self, tiers: Vec<ThumbnailTier>) -> Self {
        self.tiers = tiers;
        self
    }

    pub async fn run(
        &self,
        request: UploadRequest,
        cancel: &CancellationToken,
    ) -> Result<UploadOutcome, UploadError> {
        let mut written = WrittenFiles::default();
        match self.run_stages(request, cancel, &mut written).await {
            Ok(outcome) => {
                written.commit();
                Ok(outcome)
            }
            Err(err) => {
                written.discard().await;
                Err(err)
            }
        }
    }

    async fn run_stages(
        &self,
        request: UploadRequest,
        cancel: &CancellationToken,
        written: &mut WrittenFiles,
    ) -> Result<UploadOutcome, UploadError> {
        checkpoint(cancel, UploadStage::Validate)?;
        let validated = validate(&request)?;
        debug!(
            content_type = validated.content_type,
            bytes = request.bytes.len(),
            "upload validated"
        );

        checkpoint(cancel, UploadStage::StoreOriginal)?;
        let (original_path, original_url) = self
            .originals
            .write_new(extension_for(validated.content_type), &request.bytes)
            .await
            .map_err(|e| UploadError::new(UploadStage::StoreOriginal, e))?;
        written.push(original_path);

        checkpoint(cancel, UploadStage::GenerateVariants)?;
        let thumbnails = match validated.media_type {
            MediaType::Photo => {
                let set = self
                    .generator
                    .generate_multiple_sizes(
                        ThumbnailSource::Buffer(request.bytes.clone()),
                        &self.tiers,
                    )
                    .await
                    .map_err(|e| UploadError::new(UploadStage::GenerateVariants, e))?;
                written.extend_from_set(&set);
                if let Some(primary) = self.tiers.first().map(|t| t.name)
                    && set.get(primary).is_none()
                {
                    let reason = set
                        .failed
                        .iter()
                        .find(|f| f.tier == primary)
                        .map(|f| f.message.clone())
                        .unwrap_or_else(|| "no output".to_string());
                    return Err(UploadError::rejected(
                        UploadStage::GenerateVariants,
                        format!("primary {primary} tier failed: {reason}"),
                    ));
                }
                set
            }
            MediaType::Video => ThumbnailSet::default(),
        };

        checkpoint(cancel, UploadStage::PersistRecord)?;
        let preview = self
            .tiers
            .first()
            .and_then(|t| thumbnails.get(t.name))
            .or_else(|| thumbnails.get(TierName::Small))
            .map(|r| r.url.clone());
        let record = MediaRecord::new(validated.title, validated.media_type, original_url)
            .with_location(request.location.filter(|l| !l.trim().is_empty()))
            .with_thumbnail(preview)
            .with_variants(thumbnails.urls())
            .with_source(MediaSource::Upload);

        self.store
            .insert(record.clone())
            .await
            .map_err(|e| UploadError::new(UploadStage::PersistRecord, e))?;

        info!(
            id = %record.id,
            media_type = %record.media_type,
            variants = record.variants.len(),
            "upload stored"
        );
        Ok(UploadOutcome { record, thumbnails })
    }
}

fn checkpoint(cancel: &CancellationToken, stage: UploadStage) -> Result<(), UploadError> {
    if cancel.is_cancelled() {
        debug!(%stage, "upload cancelled");
        return Err(UploadError::cancelled(stage));
    }
    Ok(())
}

fn validate(request: &UploadRequest) -> Result<Validated, UploadError> {
    let stage = UploadStage::Validate;
    if request.bytes.is_empty() {
        return Err(UploadError::rejected(stage, "empty upload body"));
    }

    let declared = request
        .content_type
        .as_deref()
        .and_then(MediaType::from_mime);

    let (media_type, content_type) = if let Ok(ct) = validate_magic_bytes(&request.bytes) {
        (MediaType::Photo, ct)
    } else if let Some(ct) = sniff_video(&request.bytes) {
        (MediaType::Video, ct)
    } else {
        let reason = match declared {
            Some(MediaType::Photo) => "declared as an image but not a recognised image format",
            Some(MediaType::Video) => "declared as a video but not a recognised container",
            None => "unsupported media type",
        };
        return Err(UploadError::rejected(stage, reason));
    };

    if let Some(declared) = declared
        && declared != media_type
    {
        warn!(%declared, sniffed = content_type, "declared content type disagrees with upload bytes");
    }

    let title = request
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| {
            request
                .filename
                .as_deref()
                .and_then(|name| std::path::Path::new(name).file_stem())
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Untitled".to_string());

    Ok(Validated {
        media_type,
        content_type,
        title,
    })
}
