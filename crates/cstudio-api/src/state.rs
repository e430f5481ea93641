//! Application state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};

use cstudio_ai::{AiConfig, ContentService, ScriptThreadGenerator, ThreadGenerator};
use cstudio_jobs::{
    JobManager, JobStore, MemoryJobStore, ThreadProcessor, TokioSpawner, VideoProcessor,
};
use cstudio_models::{ThreadJob, VideoJob};
use cstudio_render::{BundleHandle, RemotionRenderer, RenderConfig, Renderer};
use cstudio_supabase::{
    AuthProvider, AuthResponse, AuthUser, FunnelRepository, JobRepository, SupabaseAuth,
    SupabaseClient, SupabaseError, SupabaseResult,
};

use crate::config::{ApiConfig, StoreBackend, ThreadBackend};
use crate::services::{FunnelStore, MemoryFunnelStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub videos: JobManager<VideoJob>,
    pub threads: JobManager<ThreadJob>,
    pub content: Arc<ContentService>,
    pub auth: Arc<dyn AuthProvider>,
    pub funnels: Arc<dyn FunnelStore>,
    pub bundle: BundleHandle,
    /// Directory served under `/videos`
    pub videos_dir: PathBuf,
    pub started_at: Instant,
}

/// Adapters and stores the state is assembled from.
pub struct Components {
    pub video_store: Arc<dyn JobStore<VideoJob>>,
    pub thread_store: Arc<dyn JobStore<ThreadJob>>,
    pub renderer: Arc<dyn Renderer>,
    pub thread_generator: Arc<dyn ThreadGenerator>,
    pub content: Arc<ContentService>,
    pub auth: Arc<dyn AuthProvider>,
    pub funnels: Arc<dyn FunnelStore>,
    pub bundle: BundleHandle,
}

impl AppState {
    /// Create application state from the environment.
    ///
    /// The returned bundle handle is still pending; the caller starts the
    /// bundler.
    pub fn new(config: ApiConfig, render_config: RenderConfig) -> SupabaseResult<Self> {
        let supabase = match config.store_backend {
            StoreBackend::Supabase => Some(SupabaseClient::from_env()?),
            StoreBackend::Memory => SupabaseClient::from_env()
                .map_err(|e| warn!("Supabase not configured, auth endpoints disabled: {}", e))
                .ok(),
        };

        let (video_store, thread_store, funnels): (
            Arc<dyn JobStore<VideoJob>>,
            Arc<dyn JobStore<ThreadJob>>,
            Arc<dyn FunnelStore>,
        ) = match (&supabase, config.store_backend) {
            (Some(client), StoreBackend::Supabase) => (
                Arc::new(JobRepository::<VideoJob>::new(client.clone())),
                Arc::new(JobRepository::<ThreadJob>::new(client.clone())),
                Arc::new(FunnelRepository::new(client.clone())),
            ),
            _ => {
                info!("Using in-memory stores; rows are lost on restart");
                (
                    Arc::new(MemoryJobStore::<VideoJob>::new()),
                    Arc::new(MemoryJobStore::<ThreadJob>::new()),
                    Arc::new(MemoryFunnelStore::new()),
                )
            }
        };

        let auth: Arc<dyn AuthProvider> = match supabase {
            Some(client) => Arc::new(SupabaseAuth::new(client)),
            None => Arc::new(UnavailableAuth),
        };

        let ai_config = AiConfig::from_env();
        let content = Arc::new(ContentService::new(&ai_config));
        let thread_generator: Arc<dyn ThreadGenerator> = match config.thread_backend {
            ThreadBackend::Script => match ScriptThreadGenerator::from_config(&ai_config) {
                Some(script) => Arc::new(script) as Arc<dyn ThreadGenerator>,
                None => {
                    warn!("THREAD_SCRIPT_PATH not set, falling back to OpenAI thread generation");
                    content.clone()
                }
            },
            ThreadBackend::OpenAi => content.clone(),
        };

        let bundle = BundleHandle::new();
        let renderer = Arc::new(RemotionRenderer::new(render_config, bundle.clone()));

        Ok(Self::with_components(
            config,
            Components {
                video_store,
                thread_store,
                renderer,
                thread_generator,
                content,
                auth,
                funnels,
                bundle,
            },
        ))
    }

    /// Assemble state from explicit components.
    pub fn with_components(config: ApiConfig, components: Components) -> Self {
        let spawner = Arc::new(TokioSpawner);
        let videos_dir = components.renderer.output_dir().to_path_buf();

        let videos = JobManager::new(
            components.video_store,
            Arc::new(VideoProcessor::new(components.renderer)),
            spawner.clone(),
            config.backend_url.clone(),
        );
        let threads = JobManager::new(
            components.thread_store,
            Arc::new(ThreadProcessor::new(components.thread_generator)),
            spawner,
            config.backend_url.clone(),
        );

        Self {
            config,
            videos,
            threads,
            content: components.content,
            auth: components.auth,
            funnels: components.funnels,
            bundle: components.bundle,
            videos_dir,
            started_at: Instant::now(),
        }
    }
}

/// Auth provider used when Supabase is not configured.
struct UnavailableAuth;

impl UnavailableAuth {
    fn error() -> SupabaseError {
        SupabaseError::config("Authentication is not configured")
    }
}

#[async_trait]
impl AuthProvider for UnavailableAuth {
    async fn sign_up(&self, _email: &str, _password: &str) -> SupabaseResult<AuthResponse> {
        Err(Self::error())
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> SupabaseResult<AuthResponse> {
        Err(Self::error())
    }

    async fn sign_out(&self, _access_token: &str) -> SupabaseResult<()> {
        Err(Self::error())
    }

    async fn get_user(&self, _access_token: &str) -> SupabaseResult<AuthUser> {
        Err(Self::error())
    }

    async fn reset_password(&self, _email: &str, _redirect_to: &str) -> SupabaseResult<()> {
        Err(Self::error())
    }

    async fn update_password(&self, _access_token: &str, _new_password: &str) -> SupabaseResult<AuthUser> {
        Err(Self::error())
    }
}
