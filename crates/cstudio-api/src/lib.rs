//! Axum HTTP API server.
//!
//! This crate provides:
//! - Slideshow render and thread generation job endpoints
//! - Supabase-backed auth with bearer token verification
//! - Landing page funnel CRUD
//! - Rate limiting, security headers and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{FunnelStore, MemoryFunnelStore};
pub use state::{AppState, Components};
