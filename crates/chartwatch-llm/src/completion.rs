//! One-shot completion request and response types
//!
//! Chart analysis never holds a conversation: every request is a single user
//! turn (prompt plus chart images), optionally preceded by a system prompt.

use crate::Message;
use serde::{Deserialize, Serialize};

/// Generation budget used when the caller sets none; long enough for a full
/// multi-chart analysis
pub const DEFAULT_MAX_TOKENS: usize = 4000;

/// Request sent to a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Provider-specific model name
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder {
            request: Self {
                model: model.into(),
                messages: Vec::new(),
                system: None,
                max_tokens: DEFAULT_MAX_TOKENS,
                temperature: None,
            },
        }
    }

    /// Number of images across all messages
    pub fn image_count(&self) -> usize {
        self.messages.iter().map(|m| m.images().len()).sum()
    }
}

/// Fluent construction of a [`CompletionRequest`]
#[derive(Debug, Clone)]
pub struct CompletionRequestBuilder {
    request: CompletionRequest,
}

impl CompletionRequestBuilder {
    pub fn add_message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.request.system = Some(system.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.request.max_tokens = max_tokens;
        self
    }

    /// Sampling temperature, clamped to 0.0-1.0
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request.temperature = Some(temperature.clamp(0.0, 1.0));
        self
    }

    pub fn build(self) -> CompletionRequest {
        self.request
    }
}

/// Provider reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Text of the reply, empty when the model returned none
    pub fn text(&self) -> String {
        self.message.text().unwrap_or_default()
    }

    /// Whether the reply was cut off by the token budget
    pub fn is_truncated(&self) -> bool {
        self.stop_reason == StopReason::MaxTokens
    }
}

/// Why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    /// Provider-side stop sequence or other normal stop
    StopSequence,
    /// Blocked by the provider's safety filter
    ContentFiltered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImageSource, MessageContent, Role};

    fn chart() -> ImageSource {
        ImageSource::Base64 {
            media_type: "image/png".into(),
            data: "iVBORw0KGgo=".into(),
        }
    }

    #[test]
    fn test_chart_request() {
        let request = CompletionRequest::builder("claude-sonnet-4-5-20250929")
            .system("You are a chart analyst")
            .add_message(Message::user_with_images("Analyze", vec![chart(), chart()]))
            .max_tokens(2048)
            .temperature(0.2)
            .build();

        assert_eq!(request.model, "claude-sonnet-4-5-20250929");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.image_count(), 2);
        assert_eq!(request.max_tokens, 2048);
        assert_eq!(request.temperature, Some(0.2));
    }

    #[test]
    fn test_defaults_and_clamping() {
        let request = CompletionRequest::builder("gpt-4o").build();
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(request.temperature.is_none());
        assert!(request.system.is_none());
        assert_eq!(request.image_count(), 0);

        let hot = CompletionRequest::builder("gpt-4o").temperature(1.7).build();
        assert_eq!(hot.temperature, Some(1.0));
    }

    #[test]
    fn test_response_helpers() {
        let response = CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: Some(MessageContent::Blocks(vec![])),
            },
            stop_reason: StopReason::MaxTokens,
            usage: TokenUsage {
                input_tokens: 1200,
                output_tokens: 4000,
            },
        };
        assert_eq!(response.text(), "");
        assert!(response.is_truncated());
        assert_eq!(response.usage.total(), 5200);
    }
}
