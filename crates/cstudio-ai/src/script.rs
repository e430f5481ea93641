//! Thread generation through an external script.
//!
//! The script is invoked as
//! `<python> <script> generate_thread <api_key> <topic> <style> <length> <platform>`
//! and prints one JSON object on stdout.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use cstudio_models::{ContentSource, GeneratedThread, ThreadParams, ThreadPost};

use crate::config::AiConfig;
use crate::error::{AiError, AiResult};
use crate::fallback::session_id;
use crate::service::ThreadGenerator;

const PARSE_FAILED: &str = "Failed to parse generated content";

/// Script stdout payload.
#[derive(Debug, Deserialize)]
struct ScriptOutput {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    tweets: Vec<ThreadPost>,
    #[serde(default)]
    session_id: Option<String>,
}

fn default_success() -> bool {
    true
}

/// [`ThreadGenerator`] that shells out to a generator script.
#[derive(Debug, Clone)]
pub struct ScriptThreadGenerator {
    python: String,
    script: PathBuf,
    api_key: String,
}

impl ScriptThreadGenerator {
    pub fn new(python: impl Into<String>, script: impl Into<PathBuf>, api_key: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            script: script.into(),
            api_key: api_key.into(),
        }
    }

    /// Build from config; requires `THREAD_SCRIPT_PATH`.
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        let script = config.script_path.clone()?;
        Some(Self::new(
            config.python_bin.clone(),
            script,
            config.api_key.clone().unwrap_or_default(),
        ))
    }
}

#[async_trait]
impl ThreadGenerator for ScriptThreadGenerator {
    async fn generate(&self, params: &ThreadParams) -> AiResult<GeneratedThread> {
        debug!(script = %self.script.display(), topic = %params.topic, "Running thread script");

        let output = Command::new(&self.python)
            .arg(&self.script)
            .arg("generate_thread")
            .arg(&self.api_key)
            .arg(&params.topic)
            .arg(params.style.as_str())
            .arg(params.thread_length.get().to_string())
            .arg(params.platform.as_str())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                "Unknown error".to_string()
            } else {
                stderr
            };
            warn!(exit_code = ?output.status.code(), "Thread script failed: {}", message);
            return Err(AiError::script(message, output.status.code()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed: ScriptOutput =
            serde_json::from_str(stdout.trim()).map_err(|_| AiError::parse(PARSE_FAILED))?;

        if !parsed.success {
            return Err(AiError::script(
                parsed.error.unwrap_or_else(|| "Unknown error".to_string()),
                Some(0),
            ));
        }

        Ok(GeneratedThread {
            topic: params.topic.clone(),
            style: params.style,
            platform: params.platform,
            thread_length: parsed.tweets.len(),
            tweets: parsed.tweets,
            generated_at: Utc::now(),
            session_id: parsed.session_id.unwrap_or_else(|| session_id("thread")),
            source: ContentSource::Script,
            note: None,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use cstudio_models::{Platform, ThreadLength, ThreadStyle};
    use std::path::Path;

    fn params() -> ThreadParams {
        ThreadParams {
            topic: "Rust".into(),
            style: ThreadStyle::Viral,
            thread_length: ThreadLength::new(2).unwrap(),
            platform: Platform::Linkedin,
        }
    }

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("gen.sh");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_parses_script_json() {
        let dir = tempfile::tempdir().unwrap();
        // Echo arguments back so the call shape is checked too.
        let path = script(
            dir.path(),
            r#"printf '{"success":true,"session_id":"thread_maker_1","tweets":[{"post_number":1,"content":"%s %s","character_count":3,"word_count":1}]}' "$1" "$6""#,
        );
        let generator = ScriptThreadGenerator::new("sh", path, "sk-x");

        let thread = generator.generate(&params()).await.unwrap();
        assert_eq!(thread.source, ContentSource::Script);
        assert_eq!(thread.session_id, "thread_maker_1");
        assert_eq!(thread.tweets[0].content, "generate_thread linkedin");
    }

    #[tokio::test]
    async fn test_non_zero_exit_uses_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(dir.path(), "echo 'quota exceeded' >&2; exit 1");
        let generator = ScriptThreadGenerator::new("sh", path, "");

        let err = generator.generate(&params()).await.unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[tokio::test]
    async fn test_silent_failure_is_unknown_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(dir.path(), "exit 2");
        let generator = ScriptThreadGenerator::new("sh", path, "");

        let err = generator.generate(&params()).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown error");
    }

    #[tokio::test]
    async fn test_bad_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(dir.path(), "echo 'not json'");
        let generator = ScriptThreadGenerator::new("sh", path, "");

        let err = generator.generate(&params()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse generated content");
    }
}
