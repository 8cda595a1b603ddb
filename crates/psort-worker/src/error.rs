//! Worker error types.

use std::fmt::Display;

use thiserror::Error;

use psort_models::PostReferenceError;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Failures surfaced by a pipeline run or a dispatch call.
///
/// Lower-crate errors are converted at each call site so the variant always
/// names the stage that failed.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid post reference: {0}")]
    InvalidReference(String),

    #[error("Media acquisition failed: {0}")]
    Acquisition(String),

    #[error("No media: {0}")]
    NoMedia(String),

    #[error("Image preprocessing failed: {0}")]
    Preprocess(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Invalid dispatch input: {0}")]
    InvalidDispatchInput(String),

    #[error("Task dispatch failed: {0}")]
    Dispatch(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn acquisition(err: impl Display) -> Self {
        Self::Acquisition(err.to_string())
    }

    pub fn preprocess(err: impl Display) -> Self {
        Self::Preprocess(err.to_string())
    }

    pub fn classification(err: impl Display) -> Self {
        Self::Classification(err.to_string())
    }

    pub fn upload(err: impl Display) -> Self {
        Self::Upload(err.to_string())
    }

    pub fn dispatch(err: impl Display) -> Self {
        Self::Dispatch(err.to_string())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Short stable name used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidReference(_) => "invalid_reference",
            Self::Acquisition(_) => "acquisition",
            Self::NoMedia(_) => "no_media",
            Self::Preprocess(_) => "preprocess",
            Self::Classification(_) => "classification",
            Self::Upload(_) => "upload",
            Self::InvalidDispatchInput(_) => "invalid_dispatch_input",
            Self::Dispatch(_) => "dispatch",
            Self::ConfigError(_) => "config",
            Self::Io(_) => "io",
        }
    }
}

impl From<PostReferenceError> for WorkerError {
    fn from(err: PostReferenceError) -> Self {
        match err {
            PostReferenceError::InvalidReference(url) => Self::InvalidReference(url),
        }
    }
}
