//! OpenAI-compatible chat-completions client.
//!
//! One blocking (per task) non-streaming call per generation. The base URL
//! is configurable so tests can point at a local mock server; everything
//! else comes from [`OpenAiConfig`].

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use parley_core::PromptMessage;

use crate::client::{Completion, ModelClient, ModelError, ModelResult, UsageEstimate};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default model when settings name none.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default per-call timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client configuration.
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// Bearer API key.
    pub api_key: String,
    /// Model name sent with every request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Base URL without trailing slash; `/v1/chat/completions` is appended.
    pub base_url: Option<String>,
    /// Per-call timeout. A timeout surfaces as [`ModelError::Http`].
    pub timeout: Option<Duration>,
}

impl OpenAiConfig {
    /// Config with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            temperature: 0.7,
            base_url: None,
            timeout: None,
        }
    }
}

/// Wire request body.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f64,
}

/// Wire response body (the parts we read).
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// OpenAI-compatible model client.
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client, building a reqwest client with the configured timeout.
    pub fn new(config: OpenAiConfig) -> ModelResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;
        Ok(Self { config, client })
    }

    /// Create a client with a shared reqwest client.
    #[must_use]
    pub fn with_client(config: OpenAiConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn build_headers(&self) -> ModelResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth_value = format!("Bearer {}", self.config.api_key);
        let _ = headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).map_err(|e| ModelError::InvalidResponse {
                message: format!("invalid API key header: {e}"),
            })?,
        );
        Ok(headers)
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL);
        format!("{base}/v1/chat/completions")
    }

    /// Pull the completion text out of a parsed response.
    fn extract(
        response: ChatCompletionResponse,
        prompt: &[PromptMessage],
        model: &str,
    ) -> ModelResult<Completion> {
        let Some(choice) = response.choices.into_iter().next() else {
            return Err(ModelError::InvalidResponse {
                message: "response contained no choices".into(),
            });
        };
        let text = choice.message.content;
        let usage = match response.usage {
            Some(u) => UsageEstimate {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            },
            None => UsageEstimate::from_word_counts(prompt, &text),
        };
        Ok(Completion {
            text,
            model: model.to_owned(),
            usage,
        })
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.config.model, message_count = messages.len()))]
    async fn complete(&self, messages: &[PromptMessage]) -> ModelResult<Completion> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
        };

        debug!(
            model = %self.config.model,
            message_count = messages.len(),
            "sending chat completion request"
        );
        metrics::counter!("provider_requests_total", "provider" => "openai").increment(1);

        let response = self
            .client
            .post(self.endpoint())
            .headers(self.build_headers()?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                format!("status {status}")
            } else {
                body
            };
            error!(status = status.as_u16(), "chat completion request failed");
            metrics::counter!(
                "provider_errors_total",
                "provider" => "openai",
                "status" => status.as_u16().to_string()
            )
            .increment(1);
            if status.as_u16() == 429 {
                return Err(ModelError::RateLimited { message });
            }
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse =
            response.json().await.map_err(ModelError::Http)?;
        Self::extract(parsed, messages, &self.config.model)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
