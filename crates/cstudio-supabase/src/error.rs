//! Supabase error types.

use thiserror::Error;

/// Result type for Supabase operations.
pub type SupabaseResult<T> = Result<T, SupabaseError>;

/// Errors that can occur during Supabase operations.
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The auth provider rejected the credentials or token.
    #[error("{0}")]
    Auth(String),

    #[error("Row not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Rate limited by Supabase")]
    RateLimited,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SupabaseError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map an HTTP error status to an error variant.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Auth(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            429 => Self::RateLimited,
            500..=599 => Self::ServerError(status, message),
            _ => Self::RequestFailed(message),
        }
    }

    /// HTTP status this error corresponds to, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            SupabaseError::Auth(_) => Some(401),
            SupabaseError::NotFound(_) => Some(404),
            SupabaseError::Conflict(_) => Some(409),
            SupabaseError::RateLimited => Some(429),
            SupabaseError::ServerError(status, _) => Some(*status),
            SupabaseError::RequestFailed(_) => Some(400),
            SupabaseError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True if the auth provider rejected the request.
    pub fn is_auth(&self) -> bool {
        matches!(self, SupabaseError::Auth(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_http_status() {
        assert!(matches!(
            SupabaseError::from_http_status(401, "jwt expired"),
            SupabaseError::Auth(_)
        ));
        assert!(matches!(
            SupabaseError::from_http_status(404, "missing"),
            SupabaseError::NotFound(_)
        ));
        assert!(matches!(
            SupabaseError::from_http_status(409, "duplicate key"),
            SupabaseError::Conflict(_)
        ));
        assert!(matches!(
            SupabaseError::from_http_status(429, "slow down"),
            SupabaseError::RateLimited
        ));
        assert!(matches!(
            SupabaseError::from_http_status(503, "unavailable"),
            SupabaseError::ServerError(503, _)
        ));
        assert!(matches!(
            SupabaseError::from_http_status(400, "bad filter"),
            SupabaseError::RequestFailed(_)
        ));
    }

    #[test]
    fn test_auth_error_displays_provider_message() {
        let err = SupabaseError::auth("Invalid login credentials");
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert!(err.is_auth());
        assert_eq!(err.http_status(), Some(401));
    }
}
