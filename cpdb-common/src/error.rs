//! Common error types for the ClickpackDB pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for ClickpackDB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the pipeline tools
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file could not be parsed (fatal for the run)
    #[error("Catalog parse error: {0}")]
    CatalogParse(#[from] serde_json::Error),

    /// Archive could not be opened or extracted
    #[error("Archive error ({path}): {message}")]
    Archive { path: PathBuf, message: String },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build an archive error for `path` from any displayable cause.
    pub fn archive(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Archive {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
