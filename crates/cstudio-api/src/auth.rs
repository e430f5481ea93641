//! Bearer token authentication against the auth provider.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use cstudio_supabase::AuthUser;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, verified by the auth provider.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: AuthUser,
    /// Access token the caller presented
    pub token: String,
}

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn verify(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>, ApiError> {
    let Some(token) = bearer_token(parts) else {
        return Ok(None);
    };

    match state.auth.get_user(token).await {
        Ok(user) => Ok(Some(CurrentUser {
            user,
            token: token.to_string(),
        })),
        Err(e) => {
            debug!("Token rejected by auth provider: {}", e);
            Err(ApiError::unauthorized("Invalid or expired token"))
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        verify(parts, state)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Authorization token required"))
    }
}

/// Optional caller: no header means anonymous, a bad token is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl MaybeUser {
    pub fn id(&self) -> Option<String> {
        self.0.as_ref().map(|u| u.user.id.clone())
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        verify(parts, state).await.map(MaybeUser)
    }
}
