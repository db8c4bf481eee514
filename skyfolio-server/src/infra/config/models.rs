use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_THUMBNAIL_DIR: &str = "public/thumbnails";
pub const DEFAULT_UPLOAD_DIR: &str = "public/uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub uploads: UploadConfig,
    pub fetch: FetchConfig,
    pub cors: CorsConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Explicit public origin; derived from host and port when absent
    pub public_base_url: Option<Url>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub thumbnail_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub temp_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

impl Config {
    /// Origin used to build every URL handed out by the server.
    ///
    /// A wildcard bind address is not addressable, so it is replaced by
    /// `localhost` when deriving.
    pub fn public_base_url(&self) -> Result<Url, url::ParseError> {
        if let Some(url) = &self.server.public_base_url {
            return Ok(url.clone());
        }
        let host = match self.server.host.as_str() {
            "0.0.0.0" | "::" | "[::]" => "localhost",
            other => other,
        };
        Url::parse(&format!("http://{host}:{}", self.server.port))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub(crate) fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.storage.thumbnail_dir)?;
        std::fs::create_dir_all(&self.storage.upload_dir)?;
        if let Some(temp) = &self.storage.temp_dir {
            std::fs::create_dir_all(temp)?;
        }
        Ok(())
    }
}

