//! Multi-tier cover-fit thumbnail generation.
//!
//! Sources arrive as bytes, local files or remote URLs. Each requested tier is
//! decoded, center-cropped to the tier's aspect ratio, resized to exactly the
//! tier's dimensions and re-encoded, then written under a random name into
//! the served thumbnail directory.

mod config;
mod render;
mod source;

pub use config::{DEFAULT_FETCH_TIMEOUT, DEFAULT_THUMBNAIL_ROUTE, GeneratorConfig};
pub use source::{ThumbnailSource, looks_like_http_url};

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use image::DynamicImage;
use skyfolio_model::{
    ThumbnailOptions, ThumbnailResult, ThumbnailSet, ThumbnailTier,
};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Result, ThumbnailError};
use crate::infra::media::public_dir::PublicDir;

#[derive(Clone)]
pub struct ThumbnailGenerator {
    config: Arc<GeneratorConfig>,
    output: PublicDir,
    http_client: reqwest::Client,
}

impl fmt::Debug for ThumbnailGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThumbnailGenerator")
            .field("thumbnail_dir", &self.config.thumbnail_dir)
            .field("temp_dir", &self.config.temp_dir)
            .field("public_base_url", &self.config.public_base_url.as_str())
            .field("thumbnail_route", &self.config.thumbnail_route)
            .finish()
    }
}

impl ThumbnailGenerator {
    /// Creates the thumbnail directory if it does not exist yet.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| {
                ThumbnailError::Io(std::io::Error::other(format!(
                    "Failed to create HTTP client: {e}"
                )))
            })?;
        Self::with_client(config, http_client)
    }

    pub fn with_client(
        config: GeneratorConfig,
        http_client: reqwest::Client,
    ) -> Result<Self> {
        let output = PublicDir::new(
            config.thumbnail_dir.clone(),
            config.public_base_url.clone(),
            &config.thumbnail_route,
        );
        output.ensure_exists()?;
        info!(
            dir = %config.thumbnail_dir.display(),
            route = %output.route(),
            "thumbnail generator ready"
        );

        Ok(Self {
            config: Arc::new(config),
            output,
            http_client,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn output_dir(&self) -> &PublicDir {
        &self.output
    }

    /// Decode a local file and write one rendition of it.
    pub async fn generate_from_file(
        &self,
        path: impl AsRef<Path>,
        options: ThumbnailOptions,
    ) -> Result<ThumbnailResult> {
        check_options(&options)?;
        let bytes = read_source_file(path.as_ref()).await?;
        self.generate_from_buffer(bytes, options).await
    }

    /// Download `url` to a per-call temp file and render it. The temp file is
    /// removed whether or not generation succeeds.
    pub async fn generate_from_url(
        &self,
        url: &str,
        options: ThumbnailOptions,
    ) -> Result<ThumbnailResult> {
        check_options(&options)?;
        let temp = self.download_to_temp(url).await?;
        let result = self.generate_from_file(temp.path(), options).await;
        self.discard_temp(temp).await;
        result
    }

    pub async fn generate_from_buffer(
        &self,
        bytes: impl Into<Bytes>,
        options: ThumbnailOptions,
    ) -> Result<ThumbnailResult> {
        check_options(&options)?;
        let bytes = bytes.into();
        let encoded = tokio::task::spawn_blocking(move || {
            let img = render::decode(&bytes)?;
            render::render(&img, &options)
        })
        .await
        .map_err(join_error)??;

        self.persist(&encoded, &options).await
    }

    /// Render every tier from one source. Tiers run concurrently and fail
    /// independently; the call only errors when no tier succeeds.
    pub async fn generate_multiple_sizes(
        &self,
        source: impl Into<ThumbnailSource>,
        tiers: &[ThumbnailTier],
    ) -> Result<ThumbnailSet> {
        let tiers: Vec<ThumbnailTier> = if tiers.is_empty() {
            ThumbnailTier::defaults()
        } else {
            tiers.to_vec()
        };
        for tier in &tiers {
            check_options(&tier.options)?;
        }

        let source = source.into();
        debug!(source = source.kind(), tiers = tiers.len(), "generating tiers");

        let bytes = match source {
            ThumbnailSource::Buffer(bytes) => bytes,
            ThumbnailSource::Path(path) => read_source_file(&path).await?,
            ThumbnailSource::Url(url) => {
                let temp = self.download_to_temp(&url).await?;
                let read = read_source_file(temp.path()).await;
                self.discard_temp(temp).await;
                read?
            }
        };

        let decoded = tokio::task::spawn_blocking(move || render::decode(&bytes))
            .await
            .map_err(join_error)??;
        let decoded = Arc::new(decoded);

        let outcomes = join_all(
            tiers
                .iter()
                .map(|tier| self.render_tier(Arc::clone(&decoded), *tier)),
        )
        .await;

        let mut set = ThumbnailSet::default();
        let mut last_error = None;
        for (tier, outcome) in tiers.iter().zip(outcomes) {
            match outcome {
                Ok(result) => set.set(tier.name, result),
                Err(err) => {
                    warn!(tier = %tier.name, "thumbnail tier failed: {err}");
                    set.record_failure(tier.name, err.to_string());
                    last_error = Some(err);
                }
            }
        }

        match (set.is_empty(), last_error) {
            (true, Some(err)) => Err(err),
            _ => Ok(set),
        }
    }

    /// Remove a rendition by the URL it was returned under. `Ok(false)` when
    /// the file is already gone.
    pub async fn delete_variant(&self, url: &str) -> Result<bool> {
        let removed = self.output.remove_by_url(url).await?;
        if removed {
            debug!(url, "thumbnail deleted");
        } else {
            debug!(url, "thumbnail already absent");
        }
        Ok(removed)
    }

    /// Sends a HEAD request; true only for a success status with an `image/*`
    /// content type. Never downloads the body.
    pub async fn validate_remote_image(&self, url: &str) -> bool {
        let Ok(resolved) = self.resolve_source_url(url) else {
            return false;
        };

        match self.http_client.head(resolved.clone()).send().await {
            Ok(response) => {
                let is_image = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
                    .unwrap_or(false);
                response.status().is_success() && is_image
            }
            Err(err) => {
                debug!(url = %resolved, "remote image check failed: {err}");
                false
            }
        }
    }

    /// Relative URLs are taken relative to the public base URL.
    pub fn resolve_source_url(&self, raw: &str) -> Result<Url> {
        let resolved = self.output.resolve(raw).ok_or_else(|| {
            ThumbnailError::InvalidOptions(format!("invalid source url: {raw}"))
        })?;
        match resolved.scheme() {
            "http" | "https" => Ok(resolved),
            other => Err(ThumbnailError::InvalidOptions(format!(
                "unsupported url scheme {other}: {raw}"
            ))),
        }
    }

    async fn render_tier(
        &self,
        img: Arc<DynamicImage>,
        tier: ThumbnailTier,
    ) -> Result<ThumbnailResult> {
        let options = tier.options;
        let encoded =
            tokio::task::spawn_blocking(move || render::render(&img, &options))
                .await
                .map_err(join_error)??;
        let result = self.persist(&encoded, &options).await?;
        debug!(tier = %tier.name, url = %result.url, "tier written");
        Ok(result)
    }

    async fn persist(
        &self,
        encoded: &[u8],
        options: &ThumbnailOptions,
    ) -> Result<ThumbnailResult> {
        let (path, url) = self
            .output
            .write_new(options.format.extension(), encoded)
            .await?;
        info!(
            file = path.file_name().and_then(|n| n.to_str()).unwrap_or_default(),
            bytes = encoded.len(),
            width = options.width,
            height = options.height,
            "thumbnail written"
        );
        Ok(ThumbnailResult {
            path,
            url,
            byte_size: encoded.len() as u64,
        })
    }

    async fn download_to_temp(&self, raw: &str) -> Result<NamedTempFile> {
        let url = self.resolve_source_url(raw)?;
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ThumbnailError::fetch(url.as_str(), e))?;

        if !response.status().is_success() {
            return Err(ThumbnailError::fetch(
                url.as_str(),
                format!("unexpected status {}", response.status()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ThumbnailError::fetch(url.as_str(), e))?;
        debug!(url = %url, bytes = body.len(), "source downloaded");

        let temp_dir = self.config.resolved_temp_dir();
        tokio::task::spawn_blocking(move || -> Result<NamedTempFile> {
            let mut temp = tempfile::Builder::new()
                .prefix("skyfolio-src-")
                .suffix(".download")
                .tempfile_in(&temp_dir)?;
            temp.write_all(&body)?;
            temp.flush()?;
            Ok(temp)
        })
        .await
        .map_err(join_error)?
    }

    async fn discard_temp(&self, temp: NamedTempFile) {
        let path = temp.path().to_path_buf();
        let closed = tokio::task::spawn_blocking(move || temp.close()).await;
        match closed {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(path = %path.display(), "failed to remove temp download: {err}");
            }
            Err(err) => {
                warn!(path = %path.display(), "temp cleanup task failed: {err}");
            }
        }
    }
}

fn check_options(options: &ThumbnailOptions) -> Result<()> {
    match options.invalid_reason() {
        Some(reason) => Err(ThumbnailError::InvalidOptions(reason)),
        None => Ok(()),
    }
}

async fn read_source_file(path: &Path) -> Result<Bytes> {
    tokio::fs::read(path).await.map(Bytes::from).map_err(|e| {
        ThumbnailError::Processing(format!(
            "Failed to read source {}: {e}",
            path.display()
        ))
    })
}

fn join_error(err: tokio::task::JoinError) -> ThumbnailError {
    ThumbnailError::Processing(format!("Thumbnail task failed to join: {err}"))
}
