use std::{fmt, sync::Arc};

use anyhow::Context;
use skyfolio_core::{
    GeneratorConfig, InMemoryMediaStore, MediaLibrary, MediaRecordStore,
    PublicDir, ThumbnailGenerator, UploadPipeline,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::infra::config::Config;

pub const THUMBNAIL_ROUTE: &str = "thumbnails";
pub const UPLOAD_ROUTE: &str = "uploads";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: ThumbnailGenerator,
    pub library: MediaLibrary,
    pub uploads: UploadPipeline,
    /// Parent of every per-request cancellation token; cancelled on shutdown
    pub shutdown: CancellationToken,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire services over the in-memory record store.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_store(config, Arc::new(InMemoryMediaStore::new()))
    }

    pub fn with_store(
        config: Config,
        store: Arc<dyn MediaRecordStore>,
    ) -> anyhow::Result<Self> {
        let base_url = config
            .public_base_url()
            .context("public base URL does not parse")?;

        let mut generator_config =
            GeneratorConfig::new(config.storage.thumbnail_dir.clone(), base_url.clone())
                .with_fetch_timeout(config.fetch.timeout);
        generator_config.thumbnail_route = THUMBNAIL_ROUTE.to_string();
        if let Some(temp) = &config.storage.temp_dir {
            generator_config = generator_config.with_temp_dir(temp.clone());
        }
        let generator = ThumbnailGenerator::new(generator_config)
            .context("failed to initialise thumbnail generator")?;

        let originals =
            PublicDir::new(config.storage.upload_dir.clone(), base_url.clone(), UPLOAD_ROUTE);
        originals
            .ensure_exists()
            .with_context(|| {
                format!(
                    "failed to create upload directory {}",
                    originals.dir().display()
                )
            })?;

        let library =
            MediaLibrary::new(Arc::clone(&store), generator.clone(), originals.clone());
        let uploads = UploadPipeline::new(store, generator.clone(), originals);

        info!(base_url = %base_url, "application state ready");

        Ok(Self {
            config: Arc::new(config),
            generator,
            library,
            uploads,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
