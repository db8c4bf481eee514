use thiserror::Error;

/// Why an image could not be fetched. Cells render every variant the same
/// way; the detail is for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not read image from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Network { url, .. }
            | FetchError::Timeout { url }
            | FetchError::Decode { url, .. } => url,
        }
    }

    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout { url: url.to_string() }
        } else {
            FetchError::Network {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

pub type Result<T, E = FetchError> = std::result::Result<T, E>;
