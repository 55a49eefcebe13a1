//! OpenAI-compatible chat completions provider
//!
//! This module implements the LLMProvider trait for the OpenAI chat
//! completions API and every service that speaks the same wire format.
//! chartwatch uses it for three providers:
//!
//! - OpenAI (`https://api.openai.com/v1`)
//! - Perplexity (`https://api.perplexity.ai`)
//! - xAI Grok (`https://api.x.ai/v1`)
//!
//! See: https://platform.openai.com/docs/api-reference/chat
//!
//! # Example
//!
//! ```no_run
//! use chartwatch_llm::{CompletionRequest, LLMProvider, Message};
//! use chartwatch_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OpenAIConfig::new("pplx-...")
//!         .with_api_base("https://api.perplexity.ai")
//!         .with_provider_name("perplexity")
//!         .with_timeout(60);
//!
//!     let provider = OpenAIProvider::with_config(config)?;
//!
//!     let request = CompletionRequest::builder("sonar-pro")
//!         .add_message(Message::user("Hello!"))
//!         .max_tokens(100)
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.text());
//!
//!     Ok(())
//! }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Result, Role, StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for an OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the API (default: "https://api.openai.com/v1")
    pub api_base: String,

    /// Name reported by [`LLMProvider::name`] (default: "openai")
    pub provider_name: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Set custom API base URL
    ///
    /// Useful for:
    /// - Perplexity: "https://api.perplexity.ai"
    /// - xAI: "https://api.x.ai/v1"
    /// - Local or proxied deployments
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the provider name used in logs and errors
    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = name.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            provider_name: "openai".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// OpenAI-compatible provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new provider with custom configuration
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a new OpenAI provider with API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(provider = %self.config.provider_name, model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!(
            "Sending {} image(s) to {}",
            request.image_count(),
            self.config.api_base
        );

        let openai_request = build_request(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(LLMError::from_status(status, error_text, &openai_request.model));
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| LLMError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        // Extract first choice (the API can return several, we only ask for one)
        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

        let finish_reason = choice.finish_reason.unwrap_or_default();
        let usage = openai_response.usage.unwrap_or_default();
        debug!(
            "Received response - stop_reason: {}, tokens: {}/{}",
            finish_reason, usage.prompt_tokens, usage.completion_tokens
        );

        Ok(CompletionResponse {
            message: parse_openai_response(choice.message),
            stop_reason: map_stop_reason(&finish_reason),
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }

    fn name(&self) -> &str {
        &self.config.provider_name
    }
}

// ============================================================================
// OpenAI-specific request types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: OpenAIContent,
}

#[derive(Debug, Serialize, Clone)]
#[serde(untagged)]
enum OpenAIContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// `{"type": "text", ...}` or `{"type": "image_url", ...}`
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize, Clone)]
struct ImageUrl {
    url: String,
}

// ============================================================================
// OpenAI-specific response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

// ============================================================================
// Conversion functions
// ============================================================================

/// Reasoning-era models reject `max_tokens` and take `max_completion_tokens`
fn uses_completion_tokens(model: &str) -> bool {
    model.contains("gpt-5")
}

fn build_request(request: CompletionRequest) -> OpenAIRequest {
    let (max_tokens, max_completion_tokens) = if uses_completion_tokens(&request.model) {
        (None, Some(request.max_tokens))
    } else {
        (Some(request.max_tokens), None)
    };

    OpenAIRequest {
        messages: build_openai_messages(request.system, request.messages),
        model: request.model,
        max_tokens,
        max_completion_tokens,
        temperature: request.temperature,
    }
}

/// Build OpenAI messages from our generic format
///
/// Key difference from Anthropic: system messages go into the messages array
fn build_openai_messages(system: Option<String>, messages: Vec<Message>) -> Vec<OpenAIMessage> {
    let mut result = Vec::with_capacity(messages.len() + 1);

    if let Some(sys) = system {
        result.push(OpenAIMessage {
            role: "system",
            content: OpenAIContent::Text(sys),
        });
    }

    result.extend(messages.into_iter().map(convert_message));
    result
}

/// Convert a single message to OpenAI format
fn convert_message(msg: Message) -> OpenAIMessage {
    let role = match msg.role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    };

    let content = match msg.content {
        Some(MessageContent::Text(text)) => OpenAIContent::Text(text),
        Some(MessageContent::Blocks(blocks)) => convert_blocks(blocks),
        None => OpenAIContent::Text(String::new()),
    };

    OpenAIMessage { role, content }
}

/// Text-only content stays a plain string; charts become `data:` URI parts
fn convert_blocks(blocks: Vec<ContentBlock>) -> OpenAIContent {
    let mut parts: Vec<ContentPart> = blocks
        .into_iter()
        .map(|block| match block {
            ContentBlock::Text { text } => ContentPart::Text { text },
            ContentBlock::Image { source } => ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: source.to_url(),
                },
            },
        })
        .collect();

    if let [ContentPart::Text { text }] = parts.as_mut_slice() {
        return OpenAIContent::Text(std::mem::take(text));
    }
    OpenAIContent::Parts(parts)
}

/// Parse OpenAI response message to our format
fn parse_openai_response(msg: OpenAIResponseMessage) -> Message {
    let blocks = match msg.content {
        Some(content) if !content.is_empty() => vec![ContentBlock::Text { text: content }],
        _ => Vec::new(),
    };

    Message {
        role: Role::Assistant,
        content: Some(MessageContent::Blocks(blocks)),
    }
}

/// Map OpenAI stop reason to our format
fn map_stop_reason(reason: &str) -> StopReason {
    match reason {
        "stop" => StopReason::EndTurn,
        "length" => StopReason::MaxTokens,
        "content_filter" => {
            debug!("Content filtered by provider safety systems");
            StopReason::ContentFiltered
        }
        _ => {
            debug!("Unknown stop reason: {}", reason);
            StopReason::EndTurn
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
