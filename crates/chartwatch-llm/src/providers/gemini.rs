//! Google Gemini provider implementation
//!
//! Implements the LLMProvider trait on top of the Gemini `generateContent`
//! REST endpoint. Base64 images are sent as `inlineData` parts; URL images
//! are rejected because Gemini only accepts uploaded file URIs.
//! See: https://ai.google.dev/api/generate-content

use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, ImageSource, LLMError, LLMProvider,
    Message, MessageContent, Result, Role, StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Gemini provider
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key (sent as `x-goog-api-key`)
    pub api_key: String,

    /// Base URL (default: "https://generativelanguage.googleapis.com/v1beta")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a provider with custom configuration
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider with API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GeminiConfig::new(api_key))
    }

    /// Get the current configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to Gemini API");

        let model = request.model.clone();
        let gemini_request = build_request(request)?;

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.config.api_base, model
            ))
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            if error_text.contains("RESOURCE_EXHAUSTED") {
                return Err(LLMError::RateLimitExceeded(error_text));
            }
            return Err(LLMError::from_status(status, error_text, &model));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LLMError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        into_completion(gemini_response)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// ============================================================================
// Gemini-specific request/response types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(default, skip_serializing)]
    thought: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

// ============================================================================
// Conversion functions
// ============================================================================

fn text_part(text: String) -> GeminiPart {
    GeminiPart {
        text: Some(text),
        inline_data: None,
        thought: false,
    }
}

fn build_request(request: CompletionRequest) -> Result<GeminiRequest> {
    let mut system_texts: Vec<String> = request.system.into_iter().collect();
    let mut contents = Vec::with_capacity(request.messages.len());

    for message in request.messages {
        if message.role == Role::System {
            system_texts.extend(message.text());
            continue;
        }
        contents.push(convert_message(message)?);
    }

    let system_instruction = if system_texts.is_empty() {
        None
    } else {
        Some(GeminiContent {
            role: None,
            parts: vec![text_part(system_texts.join("\n\n"))],
        })
    };

    Ok(GeminiRequest {
        contents,
        system_instruction,
        generation_config: GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
        },
    })
}

fn convert_message(message: Message) -> Result<GeminiContent> {
    let role = match message.role {
        Role::Assistant => "model",
        Role::User | Role::System => "user",
    };

    let parts = match message.content {
        Some(MessageContent::Text(text)) => vec![text_part(text)],
        Some(MessageContent::Blocks(blocks)) => blocks
            .into_iter()
            .map(|block| match block {
                ContentBlock::Text { text } => Ok(text_part(text)),
                ContentBlock::Image {
                    source: ImageSource::Base64 { media_type, data },
                } => Ok(GeminiPart {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: media_type,
                        data,
                    }),
                    thought: false,
                }),
                ContentBlock::Image {
                    source: ImageSource::Url { url },
                } => Err(LLMError::InvalidRequest(format!(
                    "Gemini requires inline image data, got URL {url}"
                ))),
            })
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(GeminiContent {
        role: Some(role.to_string()),
        parts,
    })
}

fn into_completion(response: GeminiResponse) -> Result<CompletionResponse> {
    let usage = response.usage_metadata.unwrap_or_default();

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(LLMError::EmptyResponse(format!("gemini ({reason})")));
    };

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    let finish_reason = candidate.finish_reason.unwrap_or_default();
    debug!(
        "Received response - finish_reason: {}, tokens: {}/{}",
        finish_reason, usage.prompt_token_count, usage.candidates_token_count
    );

    if text.trim().is_empty() {
        return Err(LLMError::EmptyResponse(format!(
            "gemini (finish_reason {finish_reason})"
        )));
    }

    Ok(CompletionResponse {
        message: Message {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(vec![ContentBlock::Text { text }])),
        },
        stop_reason: map_finish_reason(&finish_reason),
        usage: TokenUsage {
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
        },
    })
}

fn map_finish_reason(reason: &str) -> StopReason {
    match reason {
        "STOP" => StopReason::EndTurn,
        "MAX_TOKENS" => StopReason::MaxTokens,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => {
            StopReason::ContentFiltered
        }
        _ => StopReason::EndTurn,
    }
}
