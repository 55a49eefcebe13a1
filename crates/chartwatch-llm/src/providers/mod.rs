//! Concrete LLM provider implementations
//!
//! This module contains implementations of the LLMProvider trait for the
//! hosted vision models chartwatch consults.

#[cfg(feature = "anthropic")]
pub mod anthropic;

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicProvider;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiProvider};

#[cfg(feature = "openai")]
pub use openai::{OpenAIConfig, OpenAIProvider};
