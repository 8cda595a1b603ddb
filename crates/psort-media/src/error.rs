//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while acquiring or preparing media.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Downloader `{0}` not found in PATH")]
    DownloaderNotFound(String),

    #[error("Media acquisition failed: {message}")]
    AcquisitionFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("No media files found in {}", .0.display())]
    NoMedia(PathBuf),

    #[error("Image preprocessing failed: {0}")]
    Preprocess(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create an acquisition failure error.
    pub fn acquisition_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::AcquisitionFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a preprocessing error.
    pub fn preprocess(message: impl Into<String>) -> Self {
        Self::Preprocess(message.into())
    }
}
