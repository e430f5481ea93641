//! Error types for render operations.

use thiserror::Error;

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while bundling or rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render CLI not found in PATH: {0}")]
    BinaryNotFound(String),

    #[error("Remotion bundle failed: {0}")]
    BundleFailed(String),

    #[error("Render failed: {message}")]
    RenderFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    /// Create a render failure error.
    pub fn render_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::RenderFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a bundle failure error.
    pub fn bundle_failed(message: impl Into<String>) -> Self {
        Self::BundleFailed(message.into())
    }
}
