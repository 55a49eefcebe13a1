//! Final per-symbol verdict

use super::decision::EmailDecision;
use super::stats::ConsensusStats;
use crate::analysis::AlertLevel;
use serde::{Deserialize, Serialize};

/// Consensus over all providers for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusOutcome {
    pub has_changes: bool,
    pub alert_level: AlertLevel,
    pub summary: String,
    /// Average probability across providers, in percent
    pub trend_change_probability: f64,
    pub confidence_level: String,
    pub provider_count: usize,
    /// Share of providers that raised an alert, in percent
    pub provider_agreement: f64,
    /// The consolidated decision asked for an email
    pub consolidator_decision: bool,
    pub key_changes: Vec<String>,
    pub probability_reasoning: String,
}

impl ConsensusOutcome {
    /// Decide whether the symbol has changes worth alerting on
    ///
    /// A consolidated "send" wins. Otherwise any provider alert carries the
    /// strongest one; with neither, nothing changed.
    pub fn decide(
        stats: &ConsensusStats,
        provider_count: usize,
        decision: Option<&EmailDecision>,
    ) -> Self {
        let agreement = if provider_count == 0 {
            0.0
        } else {
            stats.alerts.len() as f64 / provider_count as f64 * 100.0
        };
        let strongest = stats.strongest_alert();

        if decision.is_some_and(|d| d.send) {
            let alert_level = strongest.map_or_else(
                || {
                    if stats.average >= 50.0 {
                        AlertLevel::Medium
                    } else {
                        AlertLevel::Low
                    }
                },
                |a| a.alert_level,
            );
            let reason = decision.map(|d| d.reason.as_str()).unwrap_or_default();

            return Self {
                has_changes: true,
                alert_level,
                summary: strongest.map_or_else(
                    || "Google AI detected significant market conditions requiring attention".to_string(),
                    |a| format!("Google AI Consensus: {}", a.summary),
                ),
                trend_change_probability: stats.average,
                confidence_level: "high".into(),
                provider_count,
                provider_agreement: agreement,
                consolidator_decision: true,
                key_changes: strongest.map(|a| a.key_changes.clone()).unwrap_or_default(),
                probability_reasoning: format!("Consolidated email decision: {reason}"),
            };
        }

        if let Some(alert) = strongest {
            return Self {
                has_changes: true,
                alert_level: alert.alert_level,
                summary: format!("Consensus from {provider_count} providers: {}", alert.summary),
                trend_change_probability: stats.average,
                confidence_level: "high".into(),
                provider_count,
                provider_agreement: agreement,
                consolidator_decision: false,
                key_changes: alert.key_changes.clone(),
                probability_reasoning: alert.reasoning.clone(),
            };
        }

        Self {
            has_changes: false,
            alert_level: AlertLevel::Low,
            summary: format!("No significant changes detected by {provider_count} providers"),
            trend_change_probability: stats.average,
            confidence_level: "medium".into(),
            provider_count,
            provider_agreement: agreement,
            consolidator_decision: false,
            key_changes: Vec::new(),
            probability_reasoning: String::new(),
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.has_changes { "ALERT" } else { "NO ALERT" }
    }
}
