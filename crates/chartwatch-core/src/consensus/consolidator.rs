//! Consolidated trading decision from all provider analyses

use super::decision::{EmailDecision, local_decision, parse_email_decision};
use super::stats::ConsensusStats;
use crate::analysis::{ProviderAnalysis, ProviderKind, build_provider};
use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::prompts::{ConsolidationSection, render_consolidation_prompt};
use chartwatch_llm::{CompletionRequest, LLMError, LLMProvider, Message, RetryPolicy};
use chartwatch_prompt::PromptRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Who produced the consolidated decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// The consolidation model
    Model,
    /// The local vote, after the model failed
    LocalFallback,
}

/// Consolidated decision text plus the email decision read from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedDecision {
    pub source: DecisionSource,
    pub text: String,
    pub email: EmailDecision,
}

impl ConsolidatedDecision {
    fn new(source: DecisionSource, text: String) -> Self {
        let email = parse_email_decision(&text);
        Self {
            source,
            text,
            email,
        }
    }
}

/// Asks one model to merge every provider's analysis into a single decision
pub struct Consolidator {
    provider: Arc<dyn LLMProvider>,
    model: String,
    prompts: Arc<PromptRegistry>,
    retry: RetryPolicy,
    max_tokens: usize,
    temperature: f32,
}

impl Consolidator {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>, prompts: Arc<PromptRegistry>) -> Self {
        Self {
            provider,
            model: model.into(),
            prompts,
            retry: RetryPolicy::default(),
            max_tokens: 4000,
            temperature: 0.2,
        }
    }

    /// Gemini consolidator when `GOOGLE_AI_CONSOLIDATION_ENABLED` is set
    pub fn from_config(config: &WatchConfig, prompts: Arc<PromptRegistry>) -> Result<Option<Self>> {
        if !config.providers.google_consolidation {
            return Ok(None);
        }

        let settings = &config.providers.google;
        let provider = build_provider(ProviderKind::Google, settings, config.request.timeout_secs)?;
        info!("Consolidation enabled with {}", settings.model);

        Ok(Some(
            Self::new(provider, settings.model.clone(), prompts)
                .with_retry(config.request.retry_policy())
                .with_generation(config.request.max_tokens, config.request.temperature),
        ))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_generation(mut self, max_tokens: usize, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Consolidate, falling back to the local vote if the model call fails
    #[instrument(skip_all, fields(symbol = %symbol))]
    pub async fn consolidate(
        &self,
        symbol: &str,
        analyses: &[ProviderAnalysis],
        stats: &ConsensusStats,
        prior: Option<&str>,
    ) -> ConsolidatedDecision {
        match self.ask_model(symbol, analyses, prior).await {
            Ok(text) => {
                info!("Consolidated decision for {} ({} chars)", symbol, text.len());
                ConsolidatedDecision::new(DecisionSource::Model, text)
            }
            Err(e) => {
                warn!("Consolidation failed for {}, using local vote: {}", symbol, e);
                ConsolidatedDecision::new(
                    DecisionSource::LocalFallback,
                    local_decision(analyses, stats, symbol),
                )
            }
        }
    }

    async fn ask_model(
        &self,
        symbol: &str,
        analyses: &[ProviderAnalysis],
        prior: Option<&str>,
    ) -> Result<String> {
        let sections: Vec<ConsolidationSection<'_>> = analyses
            .iter()
            .map(|a| ConsolidationSection {
                name: a.provider.name().to_uppercase(),
                title: a.provider.title(),
                text: &a.analysis_text,
            })
            .collect();
        let prompt = render_consolidation_prompt(&self.prompts, symbol, &sections, prior)?;

        let request = CompletionRequest::builder(&self.model)
            .add_message(Message::user(prompt))
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
            .build();

        let text = self
            .retry
            .execute("consolidation", || {
                let provider = Arc::clone(&self.provider);
                let request = request.clone();
                async move {
                    let text = provider.complete(request).await?.text();
                    if text.trim().is_empty() {
                        return Err(LLMError::EmptyResponse(provider.name().to_string()));
                    }
                    Ok(text)
                }
            })
            .await
            .map_err(WatchError::from)?;

        Ok(text)
    }
}

impl std::fmt::Debug for Consolidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consolidator")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AlertLevel;
    use crate::prompts::build_registry;
    use crate::testing::analysis;
    use async_trait::async_trait;
    use chartwatch_llm::{CompletionResponse, StopReason, TokenUsage};
    use std::sync::Mutex;

    struct ScriptedProvider {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> chartwatch_llm::Result<CompletionResponse> {
            let prompt = request.messages[0].text().unwrap_or_default();
            self.prompts.lock().unwrap().push(prompt);
            match &self.reply {
                Some(text) => Ok(CompletionResponse {
                    message: Message::assistant(text.clone()),
                    stop_reason: StopReason::EndTurn,
                    usage: TokenUsage::default(),
                }),
                None => Err(LLMError::AuthenticationFailed),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn consolidator(reply: Option<&str>) -> (Consolidator, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider {
            reply: reply.map(String::from),
            prompts: Mutex::new(Vec::new()),
        });
        let consolidator = Consolidator::new(
            provider.clone(),
            "gemini-test",
            Arc::new(build_registry(None).unwrap()),
        )
        .with_retry(RetryPolicy::no_retry());
        (consolidator, provider)
    }

    fn analyses() -> Vec<ProviderAnalysis> {
        vec![
            analysis(ProviderKind::Claude, 75.0, AlertLevel::High, 60.0),
            analysis(ProviderKind::Perplexity, 30.0, AlertLevel::Low, 60.0),
        ]
    }

    #[tokio::test]
    async fn test_model_decision() {
        let (consolidator, provider) =
            consolidator(Some("TRADING DECISION: BUY\nEMAIL ALERT DECISION: YES"));
        let analyses = analyses();
        let stats = ConsensusStats::from_analyses(&analyses);

        let decision = consolidator
            .consolidate("QBTS", &analyses, &stats, Some("prior text"))
            .await;

        assert_eq!(decision.source, DecisionSource::Model);
        assert!(decision.email.send);

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("CLAUDE ANALYSIS:\nClaude view"));
        assert!(prompts[0].contains("PERPLEXITY ANALYSIS:\nPerplexity view"));
        assert!(prompts[0].contains("PRIOR ANALYSIS FOR COMPARISON:\nprior text..."));
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_local_vote() {
        let (consolidator, _) = consolidator(None);
        let analyses = analyses();
        let stats = ConsensusStats::from_analyses(&analyses);

        let decision = consolidator.consolidate("QBTS", &analyses, &stats, None).await;

        assert_eq!(decision.source, DecisionSource::LocalFallback);
        assert!(decision.text.contains("LOCAL CONSOLIDATED TRADING DECISION FOR QBTS"));
    }

    #[tokio::test]
    async fn test_empty_reply_falls_back() {
        let (consolidator, _) = consolidator(Some("  "));
        let analyses = analyses();
        let stats = ConsensusStats::from_analyses(&analyses);

        let decision = consolidator.consolidate("QBTS", &analyses, &stats, None).await;
        assert_eq!(decision.source, DecisionSource::LocalFallback);
    }

    #[test]
    fn test_from_config_disabled() {
        let config = WatchConfig::default();
        let prompts = Arc::new(build_registry(None).unwrap());
        assert!(Consolidator::from_config(&config, prompts).unwrap().is_none());
    }
}
