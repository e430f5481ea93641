//! Synchronous content enhancement.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use cstudio_models::{EnhancedSlideshow, SlideDuration, VideoTheme};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

/// `POST /enhance-slideshow` body.
#[derive(Debug, Default, Deserialize)]
pub struct EnhanceSlideshowRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
}

impl EnhanceSlideshowRequest {
    fn into_parts(self) -> ApiResult<(String, String, VideoTheme, SlideDuration)> {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("Title is required"))?;
        let theme = match self.theme.as_deref() {
            Some(t) => t
                .parse::<VideoTheme>()
                .map_err(|e| ApiError::bad_request(e.to_string()))?,
            None => VideoTheme::default(),
        };
        let duration = match self.duration {
            Some(d) => SlideDuration::new(d).map_err(|e| ApiError::bad_request(e.to_string()))?,
            None => SlideDuration::default(),
        };
        Ok((title, self.text.unwrap_or_default(), theme, duration))
    }
}

/// Rewrite slideshow copy and split it into slides. Requires a
/// configured model; there is no template fallback here.
pub async fn enhance_slideshow(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EnhanceSlideshowRequest>,
) -> ApiResult<Json<EnhancedSlideshow>> {
    let (title, text, theme, duration) = request.into_parts()?;
    let enhanced = state
        .content
        .enhance_slideshow(&title, &text, theme, duration.seconds())
        .await?;
    Ok(Json(enhanced))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let (title, text, theme, duration) = EnhanceSlideshowRequest {
            title: Some("Launch".into()),
            ..Default::default()
        }
        .into_parts()
        .unwrap();
        assert_eq!(title, "Launch");
        assert!(text.is_empty());
        assert_eq!(theme, VideoTheme::Minimal);
        assert_eq!(duration.seconds(), 30);
    }

    #[test]
    fn test_title_required() {
        let err = EnhanceSlideshowRequest::default().into_parts().unwrap_err();
        assert_eq!(err.to_string(), "Title is required");
    }
}
