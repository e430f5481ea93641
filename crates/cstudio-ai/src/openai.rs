//! OpenAI chat completions client.

use std::time::Instant;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn, Instrument};

use crate::config::AiConfig;
use crate::error::{AiError, AiResult};

const TEMPERATURE: f64 = 0.7;

/// Metric names for completion requests.
pub mod names {
    pub const REQUESTS_TOTAL: &str = "openai_requests_total";
    pub const LATENCY_SECONDS: &str = "openai_latency_seconds";
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Chat completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// Create a client; fails when no valid key is configured.
    pub fn new(config: &AiConfig) -> AiResult<Self> {
        let api_key = config.api_key.clone().ok_or(AiError::NotConfigured)?;
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a system + user exchange and return the assistant text.
    pub async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> AiResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens,
            temperature: TEMPERATURE,
        };

        let span = info_span!("openai_request", model = %self.model, max_tokens);
        let start = Instant::now();

        let result = async {
            let response = self
                .http
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorBody>(&body)
                    .map(|b| b.error.message)
                    .unwrap_or(body);
                warn!(status = status.as_u16(), "OpenAI request failed: {}", message);
                return Err(AiError::api(status.as_u16(), message));
            }

            let body: ChatResponse = response.json().await?;
            body.choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .filter(|text| !text.trim().is_empty())
                .ok_or(AiError::EmptyResponse)
        }
        .instrument(span)
        .await;

        record_request(
            if result.is_ok() { "success" } else { "error" },
            start.elapsed().as_secs_f64(),
        );
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "OpenAI request finished");

        result
    }
}

fn record_request(status: &'static str, latency_secs: f64) {
    metrics::counter!(names::REQUESTS_TOTAL, "status" => status).increment(1);
    metrics::histogram!(names::LATENCY_SECONDS).record(latency_secs);
}
