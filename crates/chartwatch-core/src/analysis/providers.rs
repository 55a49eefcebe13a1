//! Hosted models consulted for chart analysis, and how to construct them

use crate::config::{ProviderSettings, WatchConfig};
use crate::error::{Result, WatchError};
use chartwatch_llm::LLMProvider;
use chartwatch_llm::providers::{
    AnthropicProvider, GeminiConfig, GeminiProvider, OpenAIConfig, OpenAIProvider,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

const PERPLEXITY_API_BASE: &str = "https://api.perplexity.ai";
const GROK_API_BASE: &str = "https://api.x.ai/v1";

/// A hosted model family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Perplexity,
    Claude,
    Google,
    Grok,
    OpenAI,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::Perplexity,
        ProviderKind::Claude,
        ProviderKind::Google,
        ProviderKind::Grok,
        ProviderKind::OpenAI,
    ];

    /// Lower-case identifier
    pub fn name(self) -> &'static str {
        match self {
            Self::Perplexity => "perplexity",
            Self::Claude => "claude",
            Self::Google => "google",
            Self::Grok => "grok",
            Self::OpenAI => "openai",
        }
    }

    /// Display name used in report headings
    pub fn title(self) -> &'static str {
        match self {
            Self::Perplexity => "Perplexity",
            Self::Claude => "Claude",
            Self::Google => "Google AI",
            Self::Grok => "Grok",
            Self::OpenAI => "OpenAI",
        }
    }

    /// Position in reports: Claude, Perplexity, Google, then the rest
    pub fn report_order(self) -> u8 {
        match self {
            Self::Claude => 0,
            Self::Perplexity => 1,
            Self::Google => 2,
            Self::Grok => 3,
            Self::OpenAI => 4,
        }
    }

    /// This provider's settings
    pub fn settings(self, config: &WatchConfig) -> &ProviderSettings {
        let providers = &config.providers;
        match self {
            Self::Perplexity => &providers.perplexity,
            Self::Claude => &providers.claude,
            Self::Google => &providers.google,
            Self::Grok => &providers.grok,
            Self::OpenAI => &providers.openai,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Construct the HTTP client for one provider
///
/// Perplexity, Grok and OpenAI share the OpenAI-compatible chat API and only
/// differ in base URL.
pub fn build_provider(
    kind: ProviderKind,
    settings: &ProviderSettings,
    timeout_secs: u64,
) -> Result<Arc<dyn LLMProvider>> {
    let api_key = settings
        .api_key
        .clone()
        .ok_or_else(|| WatchError::config(format!("{} API key is not set", kind.title())))?;

    let provider: Arc<dyn LLMProvider> = match kind {
        ProviderKind::Claude => {
            let mut provider = AnthropicProvider::with_timeout(api_key, timeout_secs)?;
            if let Some(base) = &settings.api_base {
                provider = provider.with_api_base(base.clone());
            }
            Arc::new(provider)
        }
        ProviderKind::Google => {
            let mut config = GeminiConfig::new(api_key).with_timeout(timeout_secs);
            if let Some(base) = &settings.api_base {
                config = config.with_api_base(base.clone());
            }
            Arc::new(GeminiProvider::with_config(config)?)
        }
        ProviderKind::Perplexity | ProviderKind::Grok | ProviderKind::OpenAI => {
            let mut config = OpenAIConfig::new(api_key)
                .with_provider_name(kind.name())
                .with_timeout(timeout_secs);
            let default_base = match kind {
                ProviderKind::Perplexity => Some(PERPLEXITY_API_BASE),
                ProviderKind::Grok => Some(GROK_API_BASE),
                _ => None,
            };
            if let Some(base) = settings.api_base.as_deref().or(default_base) {
                config = config.with_api_base(base);
            }
            Arc::new(OpenAIProvider::with_config(config)?)
        }
    };

    Ok(provider)
}
