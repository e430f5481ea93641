//! Auth handlers, delegated to the auth provider.

use std::sync::LazyLock;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::{Validate, ValidationError};

use cstudio_supabase::{AuthResponse, AuthSession, AuthUser, SupabaseError};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message("Invalid email format".into()))
    }
}

/// Provider failures on credential flows are the caller's problem; the
/// provider's message is passed through.
fn provider_error(e: SupabaseError) -> ApiError {
    match e {
        SupabaseError::Auth(msg)
        | SupabaseError::RequestFailed(msg)
        | SupabaseError::NotFound(msg)
        | SupabaseError::Conflict(msg) => ApiError::bad_request(msg),
        SupabaseError::Config(msg) => ApiError::unavailable(msg),
        SupabaseError::RateLimited => ApiError::RateLimited,
        other => ApiError::Store(other),
    }
}

/// Register/login body.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_email_format"))]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Required-field and email-format checks.
    pub fn credentials(self) -> ApiResult<(String, String)> {
        let (Some(email), Some(password)) = (
            self.email.clone().filter(|e| !e.is_empty()),
            self.password.clone().filter(|p| !p.is_empty()),
        ) else {
            return Err(ApiError::bad_request("Email and password are required"));
        };
        self.validate()?;
        Ok((email, password))
    }
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user: Option<AuthUser>,
    pub session: Option<AuthSession>,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct AuthMessageResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: AuthUser,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    #[serde(default, rename = "newPassword")]
    pub new_password: Option<String>,
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let (email, password) = request.credentials()?;
    let response = state.auth.sign_up(&email, &password).await.map_err(|e| {
        warn!("Registration error: {}", e);
        provider_error(e)
    })?;
    info!("User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: response.user,
            session: response.session,
            message: "Registration successful. Please check your email to verify your account.",
        }),
    ))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (email, password) = request.credentials()?;
    let response = state.auth.sign_in(&email, &password).await.map_err(|e| {
        warn!("Login error: {}", e);
        provider_error(e)
    })?;

    Ok(Json(response))
}

/// `POST /auth/logout`
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<AuthMessageResponse>> {
    state.auth.sign_out(&user.token).await.map_err(provider_error)?;
    Ok(Json(AuthMessageResponse {
        message: "Logout successful",
    }))
}

/// `GET /auth/profile`
pub async fn profile(user: CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse { user: user.user })
}

/// `POST /auth/reset-password`
///
/// The email link redirects to the caller's origin, or the configured
/// frontend when the request has none.
pub async fn reset_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<ResetPasswordRequest>,
) -> ApiResult<Json<AuthMessageResponse>> {
    let email = request
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Email is required"))?;

    let redirect_to = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(|origin| format!("{}/reset-password", origin.trim_end_matches('/')))
        .unwrap_or_else(|| state.config.reset_password_redirect());

    state
        .auth
        .reset_password(email.trim(), &redirect_to)
        .await
        .map_err(provider_error)?;

    Ok(Json(AuthMessageResponse {
        message: "Password reset email sent",
    }))
}

/// `PUT /auth/update-password`
pub async fn update_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<UpdatePasswordRequest>,
) -> ApiResult<Json<AuthMessageResponse>> {
    let new_password = request
        .new_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("New password is required"))?;

    state
        .auth
        .update_password(&user.token, &new_password)
        .await
        .map_err(provider_error)?;
    info!(user_id = %user.id(), "Password updated");

    Ok(Json(AuthMessageResponse {
        message: "Password updated successfully",
    }))
}
