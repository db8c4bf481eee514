use std::fmt::{self, Display};

/// Errors produced by model parsing and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    UnknownFormat(String),
    UnknownTier(String),
    UnknownMediaType(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownFormat(raw) => {
                write!(f, "unsupported output format: {raw}")
            }
            ModelError::UnknownTier(raw) => {
                write!(f, "unknown thumbnail tier: {raw}")
            }
            ModelError::UnknownMediaType(raw) => {
                write!(f, "unknown media type: {raw}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
