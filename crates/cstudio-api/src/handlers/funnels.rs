//! Landing page funnel handlers.

use std::sync::LazyLock;

use axum::extract::{Path, State};
use axum::Json;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;
use validator::{Validate, ValidationError};

use cstudio_models::{Funnel, FunnelAnalytics, FunnelSeoPatch, FunnelTemplate, FunnelUpdate};
use cstudio_jobs::LIST_LIMIT;

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

static SUBDOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9-]+$").expect("subdomain regex"));

fn validate_subdomain(subdomain: &str) -> Result<(), ValidationError> {
    if SUBDOMAIN_RE.is_match(subdomain) {
        Ok(())
    } else {
        Err(ValidationError::new("subdomain").with_message("Invalid subdomain format".into()))
    }
}

const FUNNEL_NOT_FOUND: &str = "Funnel not found";

#[derive(Debug, Default, Deserialize)]
pub struct CreateFunnelRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFunnelRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub grapes_js_data: Option<serde_json::Value>,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub css_styles: Option<String>,
    #[serde(default)]
    pub seo: Option<FunnelSeoPatch>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PublishFunnelRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_subdomain"))]
    pub subdomain: Option<String>,
    #[serde(default)]
    pub custom_domain: Option<String>,
}

#[derive(Serialize)]
pub struct FunnelResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funnel_id: Option<String>,
    pub message: &'static str,
    pub funnel: Funnel,
}

#[derive(Serialize)]
pub struct FunnelListResponse {
    pub funnels: Vec<Funnel>,
}

#[derive(Serialize)]
pub struct PublishResponse {
    pub success: bool,
    pub message: &'static str,
    pub published_url: String,
    pub subdomain: Option<String>,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: &'static str,
}

async fn load(state: &AppState, funnel_id: &str) -> ApiResult<Funnel> {
    state
        .funnels
        .get(funnel_id)
        .await?
        .ok_or_else(|| ApiError::not_found(FUNNEL_NOT_FOUND))
}

/// `POST /create-funnel`
pub async fn create_funnel(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateFunnelRequest>,
) -> ApiResult<Json<FunnelResponse>> {
    let name = request
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Funnel name is required"))?;
    let template = request
        .template
        .as_deref()
        .map(FunnelTemplate::from_name)
        .unwrap_or_default();

    let funnel = Funnel::new(
        &name,
        request.description.as_deref(),
        template,
        request.category.as_deref(),
    );
    let funnel = state.funnels.create(&funnel).await?;
    info!(funnel_id = %funnel.funnel_id, template = %template, "Funnel created");

    Ok(Json(FunnelResponse {
        success: true,
        funnel_id: Some(funnel.funnel_id.clone()),
        message: "Funnel created successfully",
        funnel,
    }))
}

/// `GET /funnels`
pub async fn list_funnels(State(state): State<AppState>) -> ApiResult<Json<FunnelListResponse>> {
    let funnels = state.funnels.list(LIST_LIMIT).await?;
    Ok(Json(FunnelListResponse { funnels }))
}

/// `GET /funnel/:id`
pub async fn get_funnel(
    State(state): State<AppState>,
    Path(funnel_id): Path<String>,
) -> ApiResult<Json<Funnel>> {
    Ok(Json(load(&state, &funnel_id).await?))
}

/// `PUT /funnel/:id`: partial update. SEO fields merge over the stored values.
pub async fn update_funnel(
    State(state): State<AppState>,
    Path(funnel_id): Path<String>,
    ApiJson(request): ApiJson<UpdateFunnelRequest>,
) -> ApiResult<Json<FunnelResponse>> {
    let seo = match request.seo {
        Some(patch) => {
            let mut seo = load(&state, &funnel_id).await?.seo;
            seo.merge(patch);
            Some(seo)
        }
        None => None,
    };

    let update = FunnelUpdate {
        name: request
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        description: request.description.map(|d| d.trim().to_string()),
        grapes_js_data: request.grapes_js_data.filter(|v| !v.is_null()),
        html_content: request.html_content,
        css_styles: request.css_styles,
        seo,
        ..FunnelUpdate::default()
    };

    let funnel = state
        .funnels
        .update(&funnel_id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found(FUNNEL_NOT_FOUND))?;

    Ok(Json(FunnelResponse {
        success: true,
        funnel_id: None,
        message: "Funnel updated successfully",
        funnel,
    }))
}

/// `POST /funnel/:id/publish`
pub async fn publish_funnel(
    State(state): State<AppState>,
    Path(funnel_id): Path<String>,
    ApiJson(mut request): ApiJson<PublishFunnelRequest>,
) -> ApiResult<Json<PublishResponse>> {
    let funnel = load(&state, &funnel_id).await?;

    request.subdomain = request.subdomain.filter(|s| !s.is_empty());
    request.validate()?;
    let subdomain = request.subdomain;

    if let Some(sub) = subdomain.as_deref() {
        if state.funnels.find_by_subdomain(sub, &funnel_id).await?.is_some() {
            return Err(ApiError::conflict("Subdomain already taken"));
        }
    }

    let base = Url::parse(&state.config.funnel_base_url)
        .map_err(|e| ApiError::internal(format!("Invalid FUNNEL_BASE_URL: {}", e)))?;
    let published_url = funnel.publish_url(&base, subdomain.as_deref());

    let custom_domain = request.custom_domain.filter(|d| !d.is_empty());
    state
        .funnels
        .update(
            &funnel_id,
            &FunnelUpdate::publish(published_url.clone(), subdomain.clone(), custom_domain),
        )
        .await?
        .ok_or_else(|| ApiError::not_found(FUNNEL_NOT_FOUND))?;
    info!(funnel_id = %funnel_id, url = %published_url, "Funnel published");

    Ok(Json(PublishResponse {
        success: true,
        message: "Funnel published successfully",
        published_url,
        subdomain,
    }))
}

/// `POST /funnel/:id/unpublish`
pub async fn unpublish_funnel(
    State(state): State<AppState>,
    Path(funnel_id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    state
        .funnels
        .update(&funnel_id, &FunnelUpdate::unpublish())
        .await?
        .ok_or_else(|| ApiError::not_found(FUNNEL_NOT_FOUND))?;

    Ok(Json(SuccessResponse {
        success: true,
        message: "Funnel unpublished successfully",
    }))
}

/// `DELETE /funnel/:id`
pub async fn delete_funnel(
    State(state): State<AppState>,
    Path(funnel_id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    if !state.funnels.delete(&funnel_id).await? {
        return Err(ApiError::not_found(FUNNEL_NOT_FOUND));
    }
    info!(funnel_id = %funnel_id, "Funnel deleted");

    Ok(Json(SuccessResponse {
        success: true,
        message: "Funnel deleted successfully",
    }))
}

/// `POST /funnel/:id/duplicate`
pub async fn duplicate_funnel(
    State(state): State<AppState>,
    Path(funnel_id): Path<String>,
) -> ApiResult<Json<FunnelResponse>> {
    let original = load(&state, &funnel_id).await?;
    let copy = state.funnels.create(&original.duplicate()).await?;

    Ok(Json(FunnelResponse {
        success: true,
        funnel_id: Some(copy.funnel_id.clone()),
        message: "Funnel duplicated successfully",
        funnel: copy,
    }))
}

/// `GET /funnel/:id/analytics`: stored counters only.
pub async fn funnel_analytics(
    State(state): State<AppState>,
    Path(funnel_id): Path<String>,
) -> ApiResult<Json<FunnelAnalytics>> {
    Ok(Json(load(&state, &funnel_id).await?.analytics))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdomain_format() {
        let ok = PublishFunnelRequest {
            subdomain: Some("spring-sale-2024".into()),
            custom_domain: None,
        };
        assert!(ok.validate().is_ok());

        let bad = PublishFunnelRequest {
            subdomain: Some("spring sale!".into()),
            custom_domain: None,
        };
        let err: ApiError = bad.validate().unwrap_err().into();
        assert_eq!(err.to_string(), "Invalid subdomain format");

        assert!(PublishFunnelRequest::default().validate().is_ok());
    }
}
