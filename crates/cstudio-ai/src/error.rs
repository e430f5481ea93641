//! Error types for content generation.

use thiserror::Error;

/// Result type for generation operations.
pub type AiResult<T> = Result<T, AiError>;

/// Errors that can occur while generating content.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("OpenAI API key not configured")]
    NotConfigured,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OpenAI API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("No content in completion response")]
    EmptyResponse,

    #[error("{message}")]
    Script {
        message: String,
        exit_code: Option<i32>,
    },

    #[error("{0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AiError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn script(message: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::Script {
            message: message.into(),
            exit_code,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
