use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use image::ImageReader;

use crate::config::DisplayConfig;
use crate::error::{FetchError, Result};

/// Encoded image bytes plus the natural size read from the header.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedImage {
    pub url: String,
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
}

impl FetchedImage {
    /// Reads only the image header to learn its dimensions.
    pub fn from_bytes(url: impl Into<String>, bytes: Bytes) -> Result<Self> {
        let url = url.into();
        let (width, height) = header_dimensions(&bytes).map_err(|reason| {
            FetchError::Decode {
                url: url.clone(),
                reason,
            }
        })?;
        Ok(Self {
            url,
            bytes,
            width,
            height,
        })
    }
}

fn header_dimensions(bytes: &[u8]) -> std::result::Result<(u32, u32), String> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .into_dimensions()
        .map_err(|e| e.to_string())
}

/// Source of image bytes for cells and the zoom viewer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedImage>;
}

/// Fetches over HTTP with a request timeout.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    pub fn from_config(config: &DisplayConfig) -> Result<Self> {
        Self::new(config.fetch_timeout())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        log::debug!("Fetching image {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Failed to fetch image: {} - {}", url, status);
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        FetchedImage::from_bytes(url, bytes)
    }
}
