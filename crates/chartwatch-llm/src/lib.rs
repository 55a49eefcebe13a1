//! LLM provider layer for chartwatch
//!
//! This crate provides provider-agnostic abstractions for sending chart
//! images to hosted vision models. It includes:
//!
//! - Message types with multi-modal (text + image) content
//! - Completion request/response types
//! - Provider trait for LLM implementations
//! - Retry policy with exponential backoff and jitter
//! - Concrete provider implementations (behind feature flags)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod retry;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, ImageSource, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use retry::RetryPolicy;

// Provider implementations (feature-gated)
pub mod providers;
