//! Upstream language model abstraction
//!
//! Provides a unified interface for the chat-completion provider:
//! - OpenAI-compatible chat completions over HTTP
//! - A disabled client for demo mode and missing credentials
//! - A mock client for tests
//!
//! The client is constructed once by the driver and shared as
//! `Arc<dyn AiClient>`; nothing in the engine reaches for a global.

use crate::config::LlmConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-call generation options
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1500,
        }
    }
}

impl CompletionOptions {
    /// Options for answering tracked queries
    pub fn for_answers(config: &LlmConfig) -> Self {
        Self {
            temperature: config.answer_temperature,
            max_tokens: config.answer_max_tokens,
        }
    }

    /// Options for structured analysis and query generation
    pub fn for_analysis(config: &LlmConfig) -> Self {
        Self {
            temperature: config.analysis_temperature,
            max_tokens: config.analysis_max_tokens,
        }
    }
}

/// Trait for text completion
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Complete a single user prompt
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// OpenAI chat-completions client
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl OpenAiClient {
    /// Create a new OpenAI client
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl AiClient for OpenAiClient {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream {
                message: format!("LLM API request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                message: format!("LLM API error {}: {}", status, body),
            });
        }

        let chat_response: ChatResponse =
            response.json().await.map_err(|e| AppError::MalformedUpstreamOutput {
                message: format!("Failed to parse LLM response: {}", e),
            })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::MalformedUpstreamOutput {
                message: "Empty response from LLM".to_string(),
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Client used when upstream calls are turned off
pub struct DisabledClient;

#[async_trait]
impl AiClient for DisabledClient {
    async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> Result<String> {
        Err(AppError::UpstreamDisabled)
    }

    fn model_name(&self) -> &str {
        "disabled"
    }
}

/// Mock client returning a canned completion, or failing when none is set
pub struct MockClient {
    response: Option<String>,
}

impl MockClient {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
        }
    }

    pub fn failing() -> Self {
        Self { response: None }
    }
}

#[async_trait]
impl AiClient for MockClient {
    async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> Result<String> {
        self.response.clone().ok_or_else(|| AppError::Upstream {
            message: "mock upstream failure".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "mock-llm"
    }
}

/// Create a client based on configuration
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn AiClient>> {
    if !config.is_enabled() {
        tracing::warn!(
            provider = %config.provider,
            demo_mode = config.demo_mode,
            "LLM calls disabled, synthetic fallbacks will be used"
        );
        return Ok(Arc::new(DisabledClient));
    }

    match config.provider.as_str() {
        "openai" => {
            let key = config.api_key.clone().ok_or_else(|| AppError::Configuration {
                message: "llm.api_key is required for the openai provider".to_string(),
            })?;
            Ok(Arc::new(OpenAiClient::new(config, key)?))
        }
        other => {
            tracing::warn!(provider = other, "Unknown LLM provider, calls disabled");
            Ok(Arc::new(DisabledClient))
        }
    }
}

/// First `open ... close` span in `text`, spanning to the last `close`.
///
/// Models wrap JSON in prose or code fences; this recovers the payload.
pub fn extract_json_block(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}
