//! Supabase REST client.
//!
//! This crate provides:
//! - A PostgREST table client with tracing spans and request metrics
//! - Typed repositories for video jobs, thread jobs and funnels
//! - A GoTrue auth client behind the [`AuthProvider`] trait

pub mod auth;
pub mod client;
pub mod error;
pub mod metrics;
pub mod repos;

pub use auth::{AuthProvider, AuthResponse, AuthSession, AuthUser, SupabaseAuth};
pub use client::{Query, SupabaseClient, SupabaseConfig};
pub use error::{SupabaseError, SupabaseResult};
pub use repos::{FunnelRepository, JobRepository, JobTable};
