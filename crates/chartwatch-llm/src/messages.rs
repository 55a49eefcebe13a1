//! Message types for LLM communication
//!
//! The shapes follow Anthropic's messages API: a message carries either plain
//! text or a list of content blocks, where a block is text or an image.
//! Other providers convert from these types into their own wire format.

use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// System message (handled separately in some providers)
    System,
}

/// Image source for multi-modal content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    /// Image from URL
    Url {
        /// Image URL
        url: String,
    },
    /// Base64-encoded image
    Base64 {
        /// Media type (e.g., "image/png")
        media_type: String,
        /// Base64-encoded image data
        data: String,
    },
}

impl ImageSource {
    /// Render as a URL usable in an `image_url` field (`data:` URI for inline images)
    pub fn to_url(&self) -> String {
        match self {
            Self::Url { url } => url.clone(),
            Self::Base64 { media_type, data } => format!("data:{media_type};base64,{data}"),
        }
    }
}

/// Content block in a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text content
    Text {
        /// Text content
        text: String,
    },

    /// Image content (base64 or URL)
    Image {
        /// Image source
        source: ImageSource,
    },
}

/// Message content: either simple text or structured blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Structured content blocks
    Blocks(Vec<ContentBlock>),
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Message content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

impl Message {
    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create an assistant message with text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create a system message with text
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create a user message with a text prompt followed by images
    pub fn user_with_images(text: impl Into<String>, images: Vec<ImageSource>) -> Self {
        let mut blocks = Vec::with_capacity(images.len() + 1);
        blocks.push(ContentBlock::Text { text: text.into() });
        blocks.extend(images.into_iter().map(|source| ContentBlock::Image { source }));

        Self {
            role: Role::User,
            content: Some(MessageContent::Blocks(blocks)),
        }
    }

    /// All text content of the message, text blocks joined in order
    pub fn text(&self) -> Option<String> {
        match &self.content {
            Some(MessageContent::Text(s)) => Some(s.clone()),
            Some(MessageContent::Blocks(blocks)) => {
                let texts: Vec<&str> = blocks
                    .iter()
                    .filter_map(|b| match b {
                        ContentBlock::Text { text } => Some(text.as_str()),
                        ContentBlock::Image { .. } => None,
                    })
                    .collect();
                if texts.is_empty() {
                    None
                } else {
                    Some(texts.concat())
                }
            }
            None => None,
        }
    }

    /// Images attached to the message
    pub fn images(&self) -> Vec<&ImageSource> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Image { source } => Some(source),
                    ContentBlock::Text { .. } => None,
                })
                .collect(),
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(data: &str) -> ImageSource {
        ImageSource::Base64 {
            media_type: "image/png".to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_user_message() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text().as_deref(), Some("Hello"));
    }

    #[test]
    fn test_assistant_message() {
        let msg = Message::assistant("Hi there");
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.text().as_deref(), Some("Hi there"));
    }

    #[test]
    fn test_user_with_images_keeps_order() {
        let msg = Message::user_with_images("Analyze", vec![png("a"), png("b")]);
        assert_eq!(msg.text().as_deref(), Some("Analyze"));

        let images = msg.images();
        assert_eq!(images.len(), 2);
        assert_eq!(images[1], &png("b"));
    }

    #[test]
    fn test_text_joins_blocks() {
        let msg = Message {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(vec![
                ContentBlock::Text {
                    text: "=== ANALYSIS ===\n".to_string(),
                },
                ContentBlock::Text {
                    text: "bullish".to_string(),
                },
            ])),
        };
        assert_eq!(msg.text().as_deref(), Some("=== ANALYSIS ===\nbullish"));
    }

    #[test]
    fn test_data_uri() {
        assert_eq!(png("abc123").to_url(), "data:image/png;base64,abc123");
    }

    #[test]
    fn test_image_block_wire_shape() {
        let block = ContentBlock::Image { source: png("xyz") };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["source"]["type"], "base64");
        assert_eq!(json["source"]["media_type"], "image/png");
        assert_eq!(json["source"]["data"], "xyz");
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::user("Test");
        let json = serde_json::to_string(&msg).unwrap();
        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.text().as_deref(), Some("Test"));
    }
}
