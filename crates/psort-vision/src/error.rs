//! Vision client error types.

use thiserror::Error;

pub type VisionResult<T> = Result<T, VisionError>;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Inference service returned {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VisionError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// HTTP status reported by the service, if the request got that far.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            VisionError::RequestFailed { status, .. } => Some(*status),
            VisionError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
