// Error types for commitview.
// Covers HTTP failures, cache IO, payload parsing, and mount point lookup.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mount element not found: #{0}")]
    MountNotFound(String),

    #[error("No cache directory available on this platform")]
    NoCacheDir,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ViewError>;
