//! API routes.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::auth::{login, logout, profile, register, reset_password, update_password};
use crate::handlers::content::enhance_slideshow;
use crate::handlers::funnels::{
    create_funnel, delete_funnel, duplicate_funnel, funnel_analytics, get_funnel, list_funnels,
    publish_funnel, unpublish_funnel, update_funnel,
};
use crate::handlers::health::{api_info, health, system_info};
use crate::handlers::threads::{
    delete_thread, generate_thread, get_thread_status, list_my_threads, list_threads,
};
use crate::handlers::videos::{
    delete_video, generate_slideshow, get_video_status, list_my_videos, list_videos,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let video_routes = Router::new()
        .route("/generate-slideshow", post(generate_slideshow))
        .route("/video-status/:video_id", get(get_video_status))
        .route("/videos", get(list_videos))
        .route("/my-videos", get(list_my_videos))
        .route("/video/:video_id", delete(delete_video));

    let thread_routes = Router::new()
        .route("/generate-thread", post(generate_thread))
        .route("/thread-status/:thread_id", get(get_thread_status))
        .route("/threads", get(list_threads))
        .route("/my-threads", get(list_my_threads))
        .route("/thread/:thread_id", delete(delete_thread));

    let content_routes = Router::new().route("/enhance-slideshow", post(enhance_slideshow));

    let auth_routes = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/profile", get(profile))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/update-password", put(update_password));

    let funnel_routes = Router::new()
        .route("/create-funnel", post(create_funnel))
        .route("/funnels", get(list_funnels))
        .route(
            "/funnel/:funnel_id",
            get(get_funnel).put(update_funnel).delete(delete_funnel),
        )
        .route("/funnel/:funnel_id/publish", post(publish_funnel))
        .route("/funnel/:funnel_id/unpublish", post(unpublish_funnel))
        .route("/funnel/:funnel_id/duplicate", post(duplicate_funnel))
        .route("/funnel/:funnel_id/analytics", get(funnel_analytics));

    let rate_limiter = Arc::new(RateLimiterCache::new(
        state.config.rate_limit_rps,
        state.config.rate_limit_burst,
    ));

    // Health probes stay outside the rate limiter
    let api_routes = Router::new()
        .merge(video_routes)
        .merge(thread_routes)
        .merge(content_routes)
        .merge(auth_routes)
        .merge(funnel_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ))
        .route("/", get(api_info))
        .route("/health", get(health))
        .route("/system-info", get(system_info));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/videos", ServeDir::new(&state.videos_dir))
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
