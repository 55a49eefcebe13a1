//! Concurrent multi-provider chart analysis

use super::evaluation::{TrendEvaluation, parse_response};
use super::providers::{ProviderKind, build_provider};
use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::prompts::render_analysis_prompt;
use crate::screenshots::{ChartKind, EncodedImage};
use chartwatch_llm::{
    CompletionRequest, ImageSource, LLMError, LLMProvider, Message, RetryPolicy,
};
use chartwatch_prompt::PromptRegistry;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const PROBE_PROMPT: &str = "Analyze these trading charts briefly.";
const PROBE_MAX_TOKENS: usize = 300;

/// One provider's successful analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAnalysis {
    pub provider: ProviderKind,
    pub model: String,
    /// Analysis section of the response (the whole response if unstructured)
    pub analysis_text: String,
    pub evaluation: TrendEvaluation,
    /// Length of the raw response in bytes
    pub raw_len: usize,
}

struct AnalyzerEntry {
    kind: ProviderKind,
    provider: Arc<dyn LLMProvider>,
    model: String,
}

/// Sends chart images to every enabled provider and parses the answers
pub struct ChartAnalyzer {
    entries: Vec<AnalyzerEntry>,
    prompts: Arc<PromptRegistry>,
    retry: RetryPolicy,
    max_tokens: usize,
    temperature: f32,
    threshold: f64,
}

impl ChartAnalyzer {
    /// Create an analyzer with no providers
    pub fn new(prompts: Arc<PromptRegistry>, threshold: f64) -> Self {
        Self {
            entries: Vec::new(),
            prompts,
            retry: RetryPolicy::default(),
            max_tokens: 4000,
            temperature: 0.2,
            threshold,
        }
    }

    /// Build an analyzer with every usable provider from the configuration
    pub fn from_config(config: &WatchConfig, prompts: Arc<PromptRegistry>) -> Result<Self> {
        let mut analyzer = Self::new(prompts, config.email_threshold)
            .with_retry(config.request.retry_policy())
            .with_generation(config.request.max_tokens, config.request.temperature);

        for kind in ProviderKind::ALL {
            let settings = kind.settings(config);
            if !settings.is_usable() {
                continue;
            }
            let provider = build_provider(kind, settings, config.request.timeout_secs)?;
            info!("{} enabled with model {}", kind.title(), settings.model);
            analyzer = analyzer.with_provider(kind, provider, settings.model.clone());
        }

        Ok(analyzer)
    }

    /// Add a provider
    pub fn with_provider(
        mut self,
        kind: ProviderKind,
        provider: Arc<dyn LLMProvider>,
        model: impl Into<String>,
    ) -> Self {
        self.entries.push(AnalyzerEntry {
            kind,
            provider,
            model: model.into(),
        });
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set generation limits
    pub fn with_generation(mut self, max_tokens: usize, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Enabled providers and their models
    pub fn providers(&self) -> Vec<(ProviderKind, &str)> {
        self.entries
            .iter()
            .map(|e| (e.kind, e.model.as_str()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Analyze the charts with all providers concurrently
    ///
    /// Failed providers are logged and left out of the result.
    #[instrument(skip_all, fields(symbol = %symbol, providers = self.entries.len()))]
    pub async fn analyze(
        &self,
        symbol: &str,
        kinds: &[ChartKind],
        images: &[EncodedImage],
        prior: Option<&str>,
    ) -> Result<Vec<ProviderAnalysis>> {
        let prompt = render_analysis_prompt(&self.prompts, symbol, kinds, prior, self.threshold)?;
        let sources: Vec<ImageSource> = images.iter().cloned().map(ImageSource::from).collect();
        let message = Message::user_with_images(prompt, sources);

        info!(
            "Sending {} charts for {} to {} providers",
            images.len(),
            symbol,
            self.entries.len()
        );

        let calls = self.entries.iter().map(|entry| {
            let request = CompletionRequest::builder(&entry.model)
                .add_message(message.clone())
                .max_tokens(self.max_tokens)
                .temperature(self.temperature)
                .build();
            async move { (entry, self.complete(entry, request).await) }
        });

        let mut analyses = Vec::new();
        for (entry, result) in join_all(calls).await {
            match result {
                Ok(text) => {
                    let (analysis_text, evaluation) = parse_response(&text, self.threshold);
                    info!(
                        "{}: {} chars, trend change probability {}%",
                        entry.kind.title(),
                        text.len(),
                        evaluation.trend_change_probability
                    );
                    analyses.push(ProviderAnalysis {
                        provider: entry.kind,
                        model: entry.model.clone(),
                        analysis_text,
                        evaluation,
                        raw_len: text.len(),
                    });
                }
                Err(e) => error!("{} analysis failed for {}: {}", entry.kind.title(), symbol, e),
            }
        }

        if analyses.is_empty() {
            warn!("No provider produced an analysis for {}", symbol);
        }
        Ok(analyses)
    }

    /// Send a short request with the charts to one provider
    pub async fn probe(&self, kind: ProviderKind, images: &[EncodedImage]) -> Result<String> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.kind == kind)
            .ok_or_else(|| WatchError::config(format!("{} is not enabled", kind.title())))?;

        let sources: Vec<ImageSource> = images.iter().cloned().map(ImageSource::from).collect();
        let request = CompletionRequest::builder(&entry.model)
            .add_message(Message::user_with_images(PROBE_PROMPT, sources))
            .max_tokens(PROBE_MAX_TOKENS)
            .temperature(self.temperature)
            .build();

        let response = entry.provider.complete(request).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(LLMError::EmptyResponse(entry.provider.name().to_string()).into());
        }
        Ok(text)
    }

    async fn complete(
        &self,
        entry: &AnalyzerEntry,
        request: CompletionRequest,
    ) -> chartwatch_llm::Result<String> {
        let operation = format!("{} analysis", entry.kind.name());
        self.retry
            .execute(&operation, || {
                let provider = Arc::clone(&entry.provider);
                let request = request.clone();
                async move {
                    let response = provider.complete(request).await?;
                    if response.is_truncated() {
                        warn!("{} reply hit the token limit", provider.name());
                    }
                    debug!("{} used {} tokens", provider.name(), response.usage.total());
                    let text = response.text();
                    if text.trim().is_empty() {
                        return Err(LLMError::EmptyResponse(provider.name().to_string()));
                    }
                    Ok(text)
                }
            })
            .await
    }
}

impl std::fmt::Debug for ChartAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartAnalyzer")
            .field("providers", &self.providers())
            .field("retry", &self.retry)
            .field("threshold", &self.threshold)
            .finish()
    }
}
