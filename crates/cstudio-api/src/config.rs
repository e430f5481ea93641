//! API configuration.

/// Storage backend for job and funnel rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Supabase,
    /// In-process maps; rows are lost on restart
    Memory,
}

/// Thread generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadBackend {
    /// OpenAI with template fallback
    OpenAi,
    /// External generator script
    Script,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Public base URL of this server, used for video links
    pub backend_url: String,
    /// Frontend base URL, used for password reset redirects
    pub frontend_url: String,
    /// Base URL published funnels are served from
    pub funnel_base_url: String,
    /// Rate limit requests per second
    pub rate_limit_rps: u32,
    /// Rate limit burst
    pub rate_limit_burst: u32,
    /// Max request body size
    pub max_body_size: usize,
    /// Expose Prometheus metrics at /metrics
    pub metrics_enabled: bool,
    pub store_backend: StoreBackend,
    pub thread_backend: ThreadBackend,
    /// Environment (development/production)
    pub environment: String,
}

const DEFAULT_PORT: u16 = 8001;

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            backend_url: format!("http://localhost:{}", DEFAULT_PORT),
            frontend_url: "http://localhost:3000".to_string(),
            funnel_base_url: "http://localhost:3000".to_string(),
            rate_limit_rps: 10,
            rate_limit_burst: 20,
            max_body_size: 10 * 1024 * 1024, // 10MB
            metrics_enabled: true,
            store_backend: StoreBackend::Supabase,
            thread_backend: ThreadBackend::OpenAi,
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port,
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            backend_url: std::env::var("BACKEND_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            frontend_url: std::env::var("FRONTEND_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.frontend_url),
            funnel_base_url: std::env::var("FUNNEL_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.funnel_base_url),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate_limit_rps),
            rate_limit_burst: std::env::var("RATE_LIMIT_BURST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate_limit_burst),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
            store_backend: match std::env::var("STORE_BACKEND").as_deref() {
                Ok("memory") => StoreBackend::Memory,
                _ => StoreBackend::Supabase,
            },
            thread_backend: match std::env::var("THREAD_GENERATOR").as_deref() {
                Ok("script") => ThreadBackend::Script,
                _ => ThreadBackend::OpenAi,
            },
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Redirect target for password reset emails.
    pub fn reset_password_redirect(&self) -> String {
        format!("{}/reset-password", self.frontend_url)
    }
}
