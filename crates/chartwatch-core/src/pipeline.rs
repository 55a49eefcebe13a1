//! End-to-end processing of one symbol: screenshots in, reports and alerts out

use crate::alert::{AlertNotifier, EmailNotifier};
use crate::analysis::{ChartAnalyzer, ProviderAnalysis, ProviderKind};
use crate::config::WatchConfig;
use crate::consensus::{ConsensusOutcome, ConsensusStats, ConsolidatedDecision, Consolidator};
use crate::error::Result;
use crate::prompts::build_registry;
use crate::report::{
    load_prior_analysis, render_html_report, render_text_report, save_combined_report,
    save_html_report,
};
use crate::screenshots::{DirectorySource, ScreenshotSource};
use chartwatch_prompt::PromptRegistry;
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Everything produced for one symbol
#[derive(Debug, Clone)]
pub struct SymbolReport {
    pub symbol: String,
    pub outcome: ConsensusOutcome,
    pub analyses: Vec<ProviderAnalysis>,
    pub decision: Option<ConsolidatedDecision>,
    pub html_path: PathBuf,
    pub text_path: PathBuf,
    pub email_sent: bool,
}

/// Counts for one pass over the symbol list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    /// No screenshots or no provider answered
    pub skipped: usize,
    pub failed: usize,
    pub alerts: usize,
    pub emails_sent: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

/// Result of probing one provider
#[derive(Debug, Clone)]
pub struct ProviderCheck {
    pub provider: ProviderKind,
    pub model: String,
    /// Reply text, or the error message
    pub result: std::result::Result<String, String>,
}

/// The trend-watch pipeline
pub struct TrendWatch {
    config: WatchConfig,
    source: Arc<dyn ScreenshotSource>,
    analyzer: ChartAnalyzer,
    consolidator: Option<Consolidator>,
    prompts: Arc<PromptRegistry>,
    notifier: Arc<dyn AlertNotifier>,
}

impl TrendWatch {
    pub fn new(
        config: WatchConfig,
        source: Arc<dyn ScreenshotSource>,
        analyzer: ChartAnalyzer,
        prompts: Arc<PromptRegistry>,
        notifier: Arc<dyn AlertNotifier>,
    ) -> Self {
        Self {
            config,
            source,
            analyzer,
            consolidator: None,
            prompts,
            notifier,
        }
    }

    /// Wire up screenshots, providers, consolidation and email from the configuration
    pub fn from_config(config: WatchConfig) -> Result<Self> {
        let prompts = Arc::new(build_registry(config.prompts_dir.as_deref())?);
        let analyzer = ChartAnalyzer::from_config(&config, Arc::clone(&prompts))?;
        let consolidator = Consolidator::from_config(&config, Arc::clone(&prompts))?;
        let source = Arc::new(DirectorySource::from_config(&config.screenshots));
        let notifier = Arc::new(EmailNotifier::new(config.email.clone()));

        if analyzer.is_empty() {
            warn!("No LLM provider is enabled; symbols will be skipped");
        }
        if !notifier.is_configured() {
            warn!("Email not configured; alerts will only be written to reports");
        }

        Ok(Self::new(config, source, analyzer, prompts, notifier).with_consolidator(consolidator))
    }

    pub fn with_consolidator(mut self, consolidator: Option<Consolidator>) -> Self {
        self.consolidator = consolidator;
        self
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn analyzer(&self) -> &ChartAnalyzer {
        &self.analyzer
    }

    /// Names of the loaded prompt templates
    pub fn prompt_names(&self) -> Vec<String> {
        self.prompts.list()
    }

    /// Analyze one symbol
    ///
    /// Returns `Ok(None)` when there is nothing to report: no screenshots, or
    /// no provider produced an analysis.
    #[instrument(skip(self))]
    pub async fn process_symbol(&self, symbol: &str) -> Result<Option<SymbolReport>> {
        let screenshots = self.source.acquire(symbol).await?;
        if screenshots.is_empty() {
            warn!("No screenshots for {}, skipping", symbol);
            return Ok(None);
        }

        let images = screenshots.encode().await?;
        let prior = load_prior_analysis(&screenshots.folder).await;

        let analyses = self
            .analyzer
            .analyze(symbol, &screenshots.kinds(), &images, prior.as_deref())
            .await?;
        if analyses.is_empty() {
            warn!("No successful analyses for {}, skipping", symbol);
            return Ok(None);
        }

        let stats = ConsensusStats::from_analyses(&analyses);
        let decision = match &self.consolidator {
            Some(consolidator) => Some(
                consolidator
                    .consolidate(symbol, &analyses, &stats, prior.as_deref())
                    .await,
            ),
            None => None,
        };
        let outcome = ConsensusOutcome::decide(
            &stats,
            analyses.len(),
            decision.as_ref().map(|d| &d.email),
        );
        info!(
            "{}: {} ({}), average probability {:.1}% across {} providers",
            symbol,
            outcome.status_label(),
            outcome.alert_level,
            outcome.trend_change_probability,
            outcome.provider_count
        );

        let generated_at = Local::now();
        let html = render_html_report(
            symbol,
            decision.as_ref(),
            &analyses,
            &stats,
            &outcome,
            generated_at,
        );
        let html_path = save_html_report(&screenshots.folder, &html).await?;

        let report = render_text_report(decision.as_ref(), &analyses, &stats);
        let email_sent = if !outcome.has_changes {
            false
        } else if self.notifier.is_configured() {
            self.notifier.send(&outcome, &report, symbol).await?
        } else {
            info!("Changes detected for {} but email is not configured", symbol);
            false
        };

        let text_path = save_combined_report(&screenshots, &report, &outcome, generated_at).await?;

        Ok(Some(SymbolReport {
            symbol: symbol.to_string(),
            outcome,
            analyses,
            decision,
            html_path,
            text_path,
            email_sent,
        }))
    }

    /// Process every symbol in order; one failure does not stop the rest
    pub async fn run_all(&self, symbols: &[String]) -> RunSummary {
        let mut summary = RunSummary::default();

        for (i, symbol) in symbols.iter().enumerate() {
            info!("Processing {} ({}/{})", symbol, i + 1, symbols.len());
            match self.process_symbol(symbol).await {
                Ok(Some(report)) => {
                    summary.processed += 1;
                    if report.outcome.has_changes {
                        summary.alerts += 1;
                    }
                    if report.email_sent {
                        summary.emails_sent += 1;
                    }
                }
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    error!("Failed to process {}: {}", symbol, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Run complete: {} processed, {} skipped, {} failed, {} alerts, {} emails",
            summary.processed, summary.skipped, summary.failed, summary.alerts, summary.emails_sent
        );
        summary
    }

    /// Send a short request with `symbol`'s charts to every enabled provider
    pub async fn check_providers(&self, symbol: &str) -> Result<Vec<ProviderCheck>> {
        let screenshots = self.source.acquire(symbol).await?;
        let images = screenshots.encode().await?;

        let mut checks = Vec::new();
        for (provider, model) in self.analyzer.providers() {
            let result = self
                .analyzer
                .probe(provider, &images)
                .await
                .map_err(|e| e.to_string());
            match &result {
                Ok(text) => info!("{} responded ({} chars)", provider.title(), text.len()),
                Err(e) => warn!("{} check failed: {}", provider.title(), e),
            }
            checks.push(ProviderCheck {
                provider,
                model: model.to_string(),
                result,
            });
        }
        Ok(checks)
    }
}

impl std::fmt::Debug for TrendWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrendWatch")
            .field("analyzer", &self.analyzer)
            .field("consolidator", &self.consolidator)
            .field("notifier_configured", &self.notifier.is_configured())
            .finish_non_exhaustive()
    }
}
