//! Generation configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Content generation configuration.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// API key; `None` when missing or malformed
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    /// External thread generator script
    pub script_path: Option<PathBuf>,
    /// Interpreter for the generator script
    pub python_bin: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
            script_path: None,
            python_bin: "python3".to_string(),
        }
    }
}

impl AiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .and_then(|key| valid_api_key(&key)),
            base_url: std::env::var("OPENAI_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: std::env::var("OPENAI_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.model),
            timeout: std::env::var("OPENAI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            script_path: std::env::var("THREAD_SCRIPT_PATH").ok().map(PathBuf::from),
            python_bin: std::env::var("PYTHON_BIN").unwrap_or(defaults.python_bin),
        }
    }

    /// Config with a key, for tests and embedding.
    pub fn with_api_key(mut self, key: impl AsRef<str>) -> Self {
        self.api_key = valid_api_key(key.as_ref());
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Accept only keys shaped like `sk-...`.
fn valid_api_key(raw: &str) -> Option<String> {
    let key = raw.trim();
    if key.starts_with("sk-") {
        Some(key.to_string())
    } else {
        None
    }
}
