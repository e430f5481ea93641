//! Social thread handlers.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use cstudio_jobs::JobView;
use cstudio_models::{
    GeneratedThread, JobId, JobStatus, Platform, ThreadJob, ThreadLength, ThreadParams, ThreadStyle,
};

use crate::auth::{CurrentUser, MaybeUser};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::handlers::videos::MessageResponse;
use crate::state::AppState;

/// `POST /generate-thread` body.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateThreadRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub thread_length: Option<u32>,
    #[serde(default)]
    pub platform: Option<String>,
}

impl GenerateThreadRequest {
    /// Validate into generation parameters, applying defaults.
    pub fn into_params(self) -> ApiResult<ThreadParams> {
        let topic = self
            .topic
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::bad_request("Topic is required"))?;

        let thread_length = match self.thread_length {
            Some(n) => ThreadLength::new(n).map_err(|e| ApiError::bad_request(e.to_string()))?,
            None => ThreadLength::default(),
        };
        let style = match self.style.as_deref() {
            Some(s) => s
                .parse::<ThreadStyle>()
                .map_err(|e| ApiError::bad_request(e.to_string()))?,
            None => ThreadStyle::default(),
        };
        let platform = match self.platform.as_deref() {
            Some(p) => p
                .parse::<Platform>()
                .map_err(|e| ApiError::bad_request(e.to_string()))?,
            None => Platform::default(),
        };

        Ok(ThreadParams {
            topic,
            style,
            thread_length,
            platform,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateThreadResponse {
    pub thread_id: String,
    pub status: JobStatus,
    pub message: &'static str,
}

/// Thread job as reported to clients.
#[derive(Debug, Serialize)]
pub struct ThreadStatusResponse {
    pub id: String,
    pub topic: String,
    pub style: ThreadStyle,
    pub thread_length: ThreadLength,
    pub platform: Platform,
    pub status: JobStatus,
    pub progress: u8,
    /// Generated posts, once completed
    pub content: Option<GeneratedThread>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobView<ThreadJob>> for ThreadStatusResponse {
    fn from(view: JobView<ThreadJob>) -> Self {
        let job = view.job;
        Self {
            id: job.id.to_string(),
            topic: job.params.topic,
            style: job.params.style,
            thread_length: job.params.thread_length,
            platform: job.params.platform,
            status: job.status,
            progress: job.progress,
            content: job.result,
            error_message: job.error,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct ThreadListResponse {
    pub threads: Vec<ThreadStatusResponse>,
}

/// Submit a thread generation.
pub async fn generate_thread(
    State(state): State<AppState>,
    user: MaybeUser,
    ApiJson(request): ApiJson<GenerateThreadRequest>,
) -> ApiResult<Json<GenerateThreadResponse>> {
    let params = request.into_params()?;
    info!(
        style = %params.style,
        platform = %params.platform,
        posts = params.thread_length.get(),
        "Thread requested"
    );

    let thread_id = state.threads.submit(params, user.id()).await?;

    Ok(Json(GenerateThreadResponse {
        thread_id: thread_id.to_string(),
        status: JobStatus::Pending,
        message: "Thread generation started",
    }))
}

/// Poll one thread job.
pub async fn get_thread_status(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadStatusResponse>> {
    let view = state
        .threads
        .get_status(&JobId::from_string(thread_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Thread not found"))?;

    Ok(Json(view.into()))
}

/// Most recent threads.
pub async fn list_threads(State(state): State<AppState>) -> ApiResult<Json<ThreadListResponse>> {
    let jobs = state.threads.list(None).await?;
    Ok(Json(ThreadListResponse {
        threads: jobs
            .into_iter()
            .map(|job| state.threads.view(job).into())
            .collect(),
    }))
}

/// Most recent threads owned by the caller.
pub async fn list_my_threads(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ThreadListResponse>> {
    let jobs = state.threads.list(Some(user.id())).await?;
    Ok(Json(ThreadListResponse {
        threads: jobs
            .into_iter()
            .map(|job| state.threads.view(job).into())
            .collect(),
    }))
}

/// Delete a thread. Unknown ids succeed.
pub async fn delete_thread(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = JobId::from_string(thread_id);
    let removed = state.threads.remove(&id).await?;
    info!(thread_id = %id, user_id = %user.id(), removed, "Thread delete requested");

    Ok(Json(MessageResponse {
        message: "Thread deleted successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let params = GenerateThreadRequest {
            topic: Some("  Rust async  ".into()),
            ..Default::default()
        }
        .into_params()
        .unwrap();

        assert_eq!(params.topic, "Rust async");
        assert_eq!(params.style, ThreadStyle::Educational);
        assert_eq!(params.thread_length.get(), 5);
        assert_eq!(params.platform, Platform::Twitter);
    }

    #[test]
    fn test_validation_messages() {
        let err = GenerateThreadRequest::default().into_params().unwrap_err();
        assert_eq!(err.to_string(), "Topic is required");

        let base = || GenerateThreadRequest {
            topic: Some("x".into()),
            ..Default::default()
        };

        let err = GenerateThreadRequest {
            thread_length: Some(21),
            ..base()
        }
        .into_params()
        .unwrap_err();
        assert_eq!(err.to_string(), "Thread length must be between 1 and 20");

        assert!(GenerateThreadRequest {
            thread_length: Some(20),
            ..base()
        }
        .into_params()
        .is_ok());

        let err = GenerateThreadRequest {
            style: Some("spicy".into()),
            ..base()
        }
        .into_params()
        .unwrap_err();
        assert!(err.to_string().starts_with("Invalid style"));

        let err = GenerateThreadRequest {
            platform: Some("myspace".into()),
            ..base()
        }
        .into_params()
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid platform. Must be one of: twitter, linkedin, instagram"
        );
    }
}
