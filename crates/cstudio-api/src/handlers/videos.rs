//! Slideshow video handlers.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use cstudio_jobs::JobView;
use cstudio_models::{
    JobId, JobStatus, SlideDuration, SlideshowParams, VideoJob, VideoTheme,
};

use crate::auth::{CurrentUser, MaybeUser};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

/// `POST /generate-slideshow` body.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateSlideshowRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
}

impl GenerateSlideshowRequest {
    /// Validate into render parameters. Nothing is persisted on failure.
    pub fn into_params(self) -> ApiResult<SlideshowParams> {
        let title = self.title.filter(|t| !t.trim().is_empty());
        let theme = self.theme.filter(|t| !t.is_empty());
        let (Some(title), Some(theme), Some(duration)) = (title, theme, self.duration) else {
            return Err(ApiError::bad_request(
                "Missing required fields: title, theme, duration",
            ));
        };

        let duration = SlideDuration::new(duration).map_err(|e| ApiError::bad_request(e.to_string()))?;
        let theme: VideoTheme = theme
            .parse()
            .map_err(|e: cstudio_models::ThemeParseError| ApiError::bad_request(e.to_string()))?;

        Ok(SlideshowParams {
            title,
            text: self.text.unwrap_or_default(),
            images: self.images.unwrap_or_default(),
            theme,
            duration,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSlideshowResponse {
    pub video_id: String,
    pub status: JobStatus,
    pub message: &'static str,
}

/// Video job as reported to clients.
#[derive(Debug, Serialize)]
pub struct VideoStatusResponse {
    pub id: String,
    pub title: String,
    pub theme: VideoTheme,
    pub duration: SlideDuration,
    pub status: JobStatus,
    pub progress: u8,
    /// Server-relative file path
    pub output_url: Option<String>,
    /// Absolute file URL
    #[serde(rename = "videoUrl")]
    pub video_url: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobView<VideoJob>> for VideoStatusResponse {
    fn from(view: JobView<VideoJob>) -> Self {
        let output_url = view.job.public_path().map(str::to_string);
        let job = view.job;
        Self {
            id: job.id.to_string(),
            title: job.params.title,
            theme: job.params.theme,
            duration: job.params.duration,
            status: job.status,
            progress: job.progress,
            output_url,
            video_url: view.result_url,
            error_message: job.error,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Submit a slideshow render.
pub async fn generate_slideshow(
    State(state): State<AppState>,
    user: MaybeUser,
    ApiJson(request): ApiJson<GenerateSlideshowRequest>,
) -> ApiResult<Json<GenerateSlideshowResponse>> {
    let params = request.into_params()?;
    info!(theme = %params.theme, duration = %params.duration, "Slideshow requested");

    let video_id = state.videos.submit(params, user.id()).await?;

    Ok(Json(GenerateSlideshowResponse {
        video_id: video_id.to_string(),
        status: JobStatus::Pending,
        message: "Video generation started",
    }))
}

/// Poll one video job.
pub async fn get_video_status(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<VideoStatusResponse>> {
    let view = state
        .videos
        .get_status(&JobId::from_string(video_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    Ok(Json(view.into()))
}

/// Most recent videos.
pub async fn list_videos(State(state): State<AppState>) -> ApiResult<Json<Vec<VideoStatusResponse>>> {
    let jobs = state.videos.list(None).await?;
    Ok(Json(
        jobs.into_iter()
            .map(|job| state.videos.view(job).into())
            .collect(),
    ))
}

/// Most recent videos owned by the caller.
pub async fn list_my_videos(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<VideoStatusResponse>>> {
    let jobs = state.videos.list(Some(user.id())).await?;
    Ok(Json(
        jobs.into_iter()
            .map(|job| state.videos.view(job).into())
            .collect(),
    ))
}

/// Delete a video and its file. Unknown ids succeed.
pub async fn delete_video(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(video_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = JobId::from_string(video_id);
    let removed = state.videos.remove(&id).await?;
    info!(video_id = %id, user_id = %user.id(), removed, "Video delete requested");

    Ok(Json(MessageResponse {
        message: "Video deleted successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(theme: &str, duration: Option<u32>) -> GenerateSlideshowRequest {
        GenerateSlideshowRequest {
            title: Some("Launch".into()),
            theme: Some(theme.into()),
            duration,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_fields() {
        let err = request("minimal", None).into_params().unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: title, theme, duration");

        let err = GenerateSlideshowRequest {
            title: Some("   ".into()),
            ..request("minimal", Some(30))
        }
        .into_params()
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: title, theme, duration");
    }

    #[test]
    fn test_duration_and_theme_are_checked() {
        let err = request("minimal", Some(45)).into_params().unwrap_err();
        assert_eq!(err.to_string(), "Duration must be 15, 30, or 60 seconds");

        let err = request("vaporwave", Some(30)).into_params().unwrap_err();
        assert!(err.to_string().starts_with("Invalid theme"));

        let params = request("cinematic", Some(60)).into_params().unwrap();
        assert_eq!(params.theme, VideoTheme::Cinematic);
        assert!(params.images.is_empty());
    }
}
