use once_cell::sync::Lazy;
use std::{fs, path::PathBuf, time::Duration};
use thiserror::Error;
use url::Url;

use super::{
    models::{
        Config, ConfigMetadata, CorsConfig, DEFAULT_FETCH_TIMEOUT_SECS,
        DEFAULT_HOST, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT,
        DEFAULT_THUMBNAIL_DIR, DEFAULT_UPLOAD_DIR, FetchConfig, ServerConfig,
        StorageConfig, UploadConfig,
    },
    sources::{EnvConfig, FileConfig},
    validation::{self, ConfigWarnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("skyfolio.toml"),
        PathBuf::from("config/skyfolio.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Skip directory creation (used by `check-config`)
    pub dry_run: bool,
}

/// Composes configuration from, in priority order, environment variables
/// (after `.env`), an optional TOML file and built-in defaults.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.options.dry_run = true;
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let mut load = self.load_from_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Compose from an already gathered environment. `.env` is not read.
    pub fn load_from_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        self.compose_config(file_config, env, config_path)
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(found) => found.clone(),
                None => return Ok((None, None)),
            },
        };

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
        config_path: Option<PathBuf>,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();
        if config_path.is_none() {
            warnings.push_with_hint(
                "No skyfolio.toml detected; using environment variables and defaults",
                "Create skyfolio.toml or point SKYFOLIO_CONFIG at one",
            );
        }

        let FileConfig {
            server: file_server,
            storage: file_storage,
            uploads: file_uploads,
            fetch: file_fetch,
            cors: file_cors,
        } = file_config.unwrap_or_default();

        let public_base_url = env
            .public_base_url
            .or(file_server.public_base_url)
            .map(|raw| parse_base_url(&raw))
            .transpose()?;

        let server = ServerConfig {
            host: env
                .server_host
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT),
            public_base_url,
        };

        let storage = StorageConfig {
            thumbnail_dir: env
                .thumbnail_dir
                .or(file_storage.thumbnail_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_THUMBNAIL_DIR)),
            upload_dir: env
                .upload_dir
                .or(file_storage.upload_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            temp_dir: env.temp_dir.or(file_storage.temp_dir),
        };

        let max_upload_bytes = env
            .max_upload_bytes
            .or(file_uploads.max_bytes)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        if max_upload_bytes == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "MAX_UPLOAD_BYTES",
                reason: "must be greater than zero".into(),
            });
        }

        let timeout_secs = env
            .fetch_timeout_secs
            .or(file_fetch.timeout_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "FETCH_TIMEOUT_SECS",
                reason: "must be greater than zero".into(),
            });
        }

        let cors = CorsConfig {
            allowed_origins: env
                .cors_allowed_origins
                .or(file_cors.allowed_origins)
                .unwrap_or_default(),
        };

        let config = Config {
            server,
            storage,
            uploads: UploadConfig { max_upload_bytes },
            fetch: FetchConfig {
                timeout: Duration::from_secs(timeout_secs),
            },
            cors,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded: false,
            },
        };

        config
            .public_base_url()
            .map_err(|source| ConfigLoadError::InvalidBaseUrl {
                raw: config.bind_address(),
                source,
            })?;

        if !self.options.dry_run {
            config
                .ensure_directories()
                .map_err(|source| ConfigLoadError::Filesystem { source })?;
        }

        warnings.extend(validation::collect_warnings(&config));

        Ok(ConfigLoad { config, warnings })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigLoadError> {
    let url = Url::parse(raw).map_err(|source| ConfigLoadError::InvalidBaseUrl {
        raw: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigLoadError::InvalidValue {
            key: "PUBLIC_BASE_URL",
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid public base URL '{raw}'")]
    InvalidBaseUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error("failed to create storage directories")]
    Filesystem {
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
