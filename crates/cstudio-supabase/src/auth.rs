//! Supabase Auth (GoTrue) client.
//!
//! Token verification is fully delegated: a bearer token is valid when
//! `GET /auth/v1/user` accepts it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::client::SupabaseClient;
use crate::error::{SupabaseError, SupabaseResult};

/// User object returned by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// Session tokens issued on sign in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// User plus session. The session is absent when sign up still needs
/// email confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: Option<AuthUser>,
    pub session: Option<AuthSession>,
}

impl AuthResponse {
    /// GoTrue answers either with a session (tokens at the top level and the
    /// user nested) or with a bare user object.
    fn from_body(body: serde_json::Value) -> SupabaseResult<Self> {
        if body.get("access_token").is_some() {
            let user = match body.get("user") {
                Some(user) if !user.is_null() => Some(serde_json::from_value(user.clone())?),
                _ => None,
            };
            let session: AuthSession = serde_json::from_value(body)?;
            return Ok(Self {
                user,
                session: Some(session),
            });
        }

        if body.get("id").is_some() {
            return Ok(Self {
                user: Some(serde_json::from_value(body)?),
                session: None,
            });
        }

        Err(SupabaseError::invalid_response(
            "auth response carried neither a session nor a user",
        ))
    }
}

/// Operations the API delegates to the external auth provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> SupabaseResult<AuthResponse>;

    async fn sign_in(&self, email: &str, password: &str) -> SupabaseResult<AuthResponse>;

    async fn sign_out(&self, access_token: &str) -> SupabaseResult<()>;

    /// Resolve a bearer token to its user, or fail with [`SupabaseError::Auth`].
    async fn get_user(&self, access_token: &str) -> SupabaseResult<AuthUser>;

    async fn reset_password(&self, email: &str, redirect_to: &str) -> SupabaseResult<()>;

    async fn update_password(&self, access_token: &str, new_password: &str)
        -> SupabaseResult<AuthUser>;
}

/// GoTrue-backed [`AuthProvider`].
#[derive(Clone)]
pub struct SupabaseAuth {
    client: SupabaseClient,
}

impl SupabaseAuth {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn call(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        user_token: Option<&str>,
        query: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> SupabaseResult<Option<serde_json::Value>> {
        self.client
            .execute_request(operation, "auth", None, async {
                let mut request = self.client.auth_request(method, path, user_token);
                if !query.is_empty() {
                    request = request.query(query);
                }
                if let Some(body) = &body {
                    request = request.json(body);
                }

                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    let err = SupabaseClient::handle_error_response(status, "auth", response).await;
                    // Bad credentials come back as 400 from the token endpoint.
                    return Err(match err {
                        SupabaseError::RequestFailed(msg) => SupabaseError::Auth(msg),
                        other => other,
                    });
                }

                let text = response.text().await?;
                if text.trim().is_empty() {
                    return Ok(None);
                }
                Ok(Some(serde_json::from_str(&text)?))
            })
            .await
    }

    fn expect_body(body: Option<serde_json::Value>) -> SupabaseResult<serde_json::Value> {
        body.ok_or_else(|| SupabaseError::invalid_response("empty auth response"))
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn sign_up(&self, email: &str, password: &str) -> SupabaseResult<AuthResponse> {
        let body = self
            .call(
                "auth_sign_up",
                Method::POST,
                "signup",
                None,
                &[],
                Some(json!({ "email": email, "password": password })),
            )
            .await?;
        AuthResponse::from_body(Self::expect_body(body)?)
    }

    async fn sign_in(&self, email: &str, password: &str) -> SupabaseResult<AuthResponse> {
        let body = self
            .call(
                "auth_sign_in",
                Method::POST,
                "token",
                None,
                &[("grant_type", "password")],
                Some(json!({ "email": email, "password": password })),
            )
            .await?;
        AuthResponse::from_body(Self::expect_body(body)?)
    }

    async fn sign_out(&self, access_token: &str) -> SupabaseResult<()> {
        self.call("auth_sign_out", Method::POST, "logout", Some(access_token), &[], None)
            .await?;
        debug!("Session signed out");
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> SupabaseResult<AuthUser> {
        let body = self
            .call("auth_get_user", Method::GET, "user", Some(access_token), &[], None)
            .await?;
        Ok(serde_json::from_value(Self::expect_body(body)?)?)
    }

    async fn reset_password(&self, email: &str, redirect_to: &str) -> SupabaseResult<()> {
        self.call(
            "auth_recover",
            Method::POST,
            "recover",
            None,
            &[("redirect_to", redirect_to)],
            Some(json!({ "email": email })),
        )
        .await?;
        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> SupabaseResult<AuthUser> {
        let body = self
            .call(
                "auth_update_user",
                Method::PUT,
                "user",
                Some(access_token),
                &[],
                Some(json!({ "password": new_password })),
            )
            .await?;
        Ok(serde_json::from_value(Self::expect_body(body)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SupabaseConfig;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn auth_for(server: &MockServer) -> SupabaseAuth {
        SupabaseAuth::new(SupabaseClient::new(SupabaseConfig::new(server.uri(), "anon")).unwrap())
    }

    #[tokio::test]
    async fn test_sign_in_returns_session_and_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(body_json(json!({"email": "a@b.co", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt",
                "refresh_token": "refresh",
                "token_type": "bearer",
                "expires_in": 3600,
                "user": {"id": "user-1", "email": "a@b.co"}
            })))
            .mount(&server)
            .await;

        let res = auth_for(&server).sign_in("a@b.co", "pw").await.unwrap();
        assert_eq!(res.session.unwrap().access_token, "jwt");
        assert_eq!(res.user.unwrap().id, "user-1");
    }

    #[tokio::test]
    async fn test_bad_credentials_are_auth_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let err = auth_for(&server).sign_in("a@b.co", "bad").await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_sign_up_without_confirmation_has_no_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "user-2",
                "email": "new@b.co"
            })))
            .mount(&server)
            .await;

        let res = auth_for(&server).sign_up("new@b.co", "pw").await.unwrap();
        assert!(res.session.is_none());
        assert_eq!(res.user.unwrap().email.as_deref(), Some("new@b.co"));
    }

    #[tokio::test]
    async fn test_get_user_uses_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer user-jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "user-3"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"msg": "invalid JWT"})),
            )
            .mount(&server)
            .await;

        let auth = auth_for(&server);
        assert_eq!(auth.get_user("user-jwt").await.unwrap().id, "user-3");
        assert!(auth.get_user("stale").await.unwrap_err().is_auth());
    }

    #[tokio::test]
    async fn test_logout_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        auth_for(&server).sign_out("jwt").await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_password_passes_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/recover"))
            .and(query_param("redirect_to", "http://localhost:3000/reset-password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        auth_for(&server)
            .reset_password("a@b.co", "http://localhost:3000/reset-password")
            .await
            .unwrap();
    }
}
