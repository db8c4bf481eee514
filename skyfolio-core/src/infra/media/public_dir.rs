//! A directory on disk that is served verbatim under a URL route.
//!
//! Thumbnails and stored originals both live in one of these. File names are
//! random UUIDs, so a name never carries source information and two writers
//! never collide.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{Result, ThumbnailError};

#[derive(Debug, Clone)]
pub struct PublicDir {
    dir: PathBuf,
    base_url: Url,
    route: String,
}

impl PublicDir {
    pub fn new(dir: impl Into<PathBuf>, base_url: Url, route: &str) -> Self {
        Self {
            dir: dir.into(),
            base_url,
            route: route.trim_matches('/').to_string(),
        }
    }

    /// Create the directory (and parents) when missing.
    pub fn ensure_exists(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn unique_name(extension: &str) -> String {
        format!("{}.{}", Uuid::new_v4(), extension)
    }

    /// `<base>/<route>/<file>`
    pub fn url_for(&self, file_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.route,
            file_name
        )
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Resolve a possibly relative URL against the public base URL.
    pub fn resolve(&self, raw: &str) -> Option<Url> {
        match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                self.base_url.join(raw).ok()
            }
            Err(_) => None,
        }
    }

    /// Last path segment of a URL previously produced by [`Self::url_for`].
    ///
    /// Returns `None` for anything that is not a plain file name, which
    /// rules out traversal through the delete path.
    pub fn file_name_from_url(&self, raw: &str) -> Option<String> {
        let url = self.resolve(raw)?;
        let name = url.path_segments()?.next_back()?;
        is_plain_file_name(name).then(|| name.to_string())
    }

    /// Whether `raw` points into this directory's route.
    pub fn owns_url(&self, raw: &str) -> bool {
        let Some(url) = self.resolve(raw) else {
            return false;
        };
        let Some(segments) = url.path_segments() else {
            return false;
        };
        let segments: Vec<&str> = segments.collect();
        let route: Vec<&str> = self.route.split('/').collect();
        let Some((file_name, parents)) = segments.split_last() else {
            return false;
        };
        parents.ends_with(&route) && is_plain_file_name(file_name)
    }

    /// Write `bytes` under a fresh name. A failed write never leaves a
    /// partial file behind.
    pub async fn write_new(
        &self,
        extension: &str,
        bytes: &[u8],
    ) -> Result<(PathBuf, String)> {
        let file_name = Self::unique_name(extension);
        let path = self.path_for(&file_name);

        if let Err(err) = tokio::fs::write(&path, bytes).await {
            if let Err(cleanup) = tokio::fs::remove_file(&path).await
                && cleanup.kind() != io::ErrorKind::NotFound
            {
                warn!(path = %path.display(), "failed to remove partial file: {cleanup}");
            }
            return Err(ThumbnailError::Io(err));
        }

        debug!(file = %file_name, bytes = bytes.len(), "file written");
        Ok((path, self.url_for(&file_name)))
    }

    /// Remove the file a URL points at. `Ok(false)` when it was already gone.
    pub async fn remove_by_url(&self, raw: &str) -> Result<bool> {
        let file_name = self.file_name_from_url(raw).ok_or_else(|| {
            ThumbnailError::InvalidOptions(format!(
                "not a file url under /{}: {raw}",
                self.route
            ))
        })?;

        match tokio::fs::remove_file(self.path_for(&file_name)).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(ThumbnailError::Io(err)),
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
