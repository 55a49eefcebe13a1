//! Error types for the trend-watch pipeline

use thiserror::Error;

/// Trend-watch specific errors
#[derive(Debug, Error)]
pub enum WatchError {
    /// Provider call failed
    #[error("LLM error: {0}")]
    Llm(#[from] chartwatch_llm::LLMError),

    /// Prompt template failed to load or render
    #[error("Prompt error: {0}")]
    Prompt(#[from] chartwatch_prompt::PromptError),

    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Screenshots missing or unreadable
    #[error("Screenshot error for {symbol}: {reason}")]
    Screenshot {
        symbol: String,
        reason: String,
    },

    /// Email could not be built or delivered
    #[error("Email error: {0}")]
    Email(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for trend-watch operations
pub type Result<T> = std::result::Result<T, WatchError>;

impl WatchError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn screenshot(symbol: &str, reason: impl Into<String>) -> Self {
        Self::Screenshot {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}
