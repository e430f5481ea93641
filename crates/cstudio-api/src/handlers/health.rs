//! Health and service info handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Service banner.
#[derive(Serialize)]
pub struct ApiInfoResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// `GET /api`
pub async fn api_info() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        message: "Content Studio API",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Runtime details for operators.
#[derive(Serialize)]
pub struct SystemInfoResponse {
    pub version: &'static str,
    pub platform: &'static str,
    pub arch: &'static str,
    /// Seconds since startup
    pub uptime: u64,
    pub env: String,
    pub timestamp: String,
}

/// `GET /api/system-info`
pub async fn system_info(State(state): State<AppState>) -> Json<SystemInfoResponse> {
    Json(SystemInfoResponse {
        version: env!("CARGO_PKG_VERSION"),
        platform: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        uptime: state.started_at.elapsed().as_secs(),
        env: state.config.environment.clone(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub services: ServiceChecks,
    /// Seconds since startup
    pub uptime: u64,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ServiceChecks {
    pub remotion: &'static str,
    pub database: &'static str,
    pub server: &'static str,
}

/// `GET /api/health`: 200 only when the render bundle is ready and the
/// store is reachable.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let bundle_ready = state.bundle.is_ready();
    let database_ok = match state.videos.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Database health check failed: {}", e);
            false
        }
    };

    let healthy = bundle_ready && database_ok;
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        timestamp: Utc::now().to_rfc3339(),
        services: ServiceChecks {
            remotion: state.bundle.state().label(),
            database: if database_ok { "connected" } else { "error" },
            server: "running",
        },
        uptime: state.started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
