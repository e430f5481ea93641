//! Content generation service.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use cstudio_models::{
    slide_count, ContentSource, EnhancedSlideshow, GeneratedThread, ThreadParams, VideoTheme,
};

use crate::config::AiConfig;
use crate::error::{AiError, AiResult};
use crate::fallback::{fallback_thread, session_id};
use crate::openai::OpenAiClient;
use crate::parse::{parse_slideshow_response, parse_thread_response};
use crate::prompts;

const THREAD_MAX_TOKENS: u32 = 4096;
const SLIDESHOW_MAX_TOKENS: u32 = 2048;

/// Given thread parameters, produce structured content or fail.
#[async_trait]
pub trait ThreadGenerator: Send + Sync {
    async fn generate(&self, params: &ThreadParams) -> AiResult<GeneratedThread>;
}

/// OpenAI-backed generation with a template fallback for threads.
#[derive(Clone)]
pub struct ContentService {
    client: Option<OpenAiClient>,
}

impl ContentService {
    pub fn new(config: &AiConfig) -> Self {
        let client = match OpenAiClient::new(config) {
            Ok(client) => {
                info!(model = client.model(), "OpenAI client initialized");
                Some(client)
            }
            Err(e) => {
                warn!("OpenAI unavailable, threads will use fallback templates: {}", e);
                None
            }
        };
        Self { client }
    }

    pub fn from_env() -> Self {
        Self::new(&AiConfig::from_env())
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Generate a thread. Never fails: any problem yields template content.
    pub async fn generate_thread(&self, params: &ThreadParams) -> GeneratedThread {
        let n = params.thread_length.get();

        let Some(client) = &self.client else {
            warn!("OpenAI not available, using fallback content generation");
            return fallback_thread(&params.topic, params.style, n, params.platform);
        };

        let system = prompts::thread_system_prompt(params.style, n, params.platform);
        let user = prompts::thread_user_prompt(&params.topic, n);

        match client.complete(&system, &user, THREAD_MAX_TOKENS).await {
            Ok(response) => {
                let tweets = parse_thread_response(&response);
                GeneratedThread {
                    topic: params.topic.clone(),
                    style: params.style,
                    platform: params.platform,
                    thread_length: tweets.len(),
                    tweets,
                    generated_at: Utc::now(),
                    session_id: session_id("thread"),
                    source: ContentSource::Openai,
                    note: None,
                }
            }
            Err(e) => {
                warn!("Thread generation failed, using fallback content: {}", e);
                fallback_thread(&params.topic, params.style, n, params.platform)
            }
        }
    }

    /// Rewrite slideshow copy into structured slides.
    pub async fn enhance_slideshow(
        &self,
        title: &str,
        text: &str,
        theme: VideoTheme,
        duration: u32,
    ) -> AiResult<EnhancedSlideshow> {
        let client = self.client.as_ref().ok_or(AiError::NotConfigured)?;

        let system = prompts::slideshow_system_prompt(theme, duration);
        let user = prompts::slideshow_user_prompt(title, text, theme, duration);
        info!(theme = %theme, duration, slides = slide_count(duration), "Enhancing slideshow");

        let response = client.complete(&system, &user, SLIDESHOW_MAX_TOKENS).await?;
        let parsed = parse_slideshow_response(&response, duration);

        Ok(EnhancedSlideshow {
            title: title.to_string(),
            theme,
            duration,
            enhanced_text: parsed.enhanced_text,
            slides: parsed.slides,
            generated_at: Utc::now(),
            session_id: session_id("slideshow"),
        })
    }
}

#[async_trait]
impl ThreadGenerator for ContentService {
    async fn generate(&self, params: &ThreadParams) -> AiResult<GeneratedThread> {
        Ok(self.generate_thread(params).await)
    }
}
