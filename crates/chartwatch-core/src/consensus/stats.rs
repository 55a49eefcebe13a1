//! Probability statistics and alert collection across providers

use crate::analysis::{AlertLevel, ProviderAnalysis, ProviderKind};
use serde::{Deserialize, Serialize};

/// A provider whose evaluation crossed the alert threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderAlert {
    pub provider: ProviderKind,
    pub alert_level: AlertLevel,
    pub summary: String,
    pub probability: f64,
    pub key_changes: Vec<String>,
    pub reasoning: String,
}

/// Average, range and alerts over all provider evaluations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsensusStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Number of probabilities collected
    pub count: usize,
    pub alerts: Vec<ProviderAlert>,
}

impl ConsensusStats {
    pub fn from_analyses(analyses: &[ProviderAnalysis]) -> Self {
        let probabilities: Vec<f64> = analyses
            .iter()
            .map(|a| a.evaluation.trend_change_probability)
            .collect();

        let alerts = analyses
            .iter()
            .filter(|a| a.evaluation.has_changes)
            .map(|a| ProviderAlert {
                provider: a.provider,
                alert_level: a.evaluation.alert_level,
                summary: a.evaluation.summary.clone(),
                probability: a.evaluation.trend_change_probability,
                key_changes: a.evaluation.key_changes.clone(),
                reasoning: a.evaluation.probability_reasoning.clone(),
            })
            .collect();

        if probabilities.is_empty() {
            return Self {
                alerts,
                ..Self::default()
            };
        }

        let average = probabilities.iter().sum::<f64>() / probabilities.len() as f64;
        Self {
            average,
            min: probabilities.iter().copied().fold(f64::INFINITY, f64::min),
            max: probabilities.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            count: probabilities.len(),
            alerts,
        }
    }

    /// Most severe alert; the first one wins on ties
    pub fn strongest_alert(&self) -> Option<&ProviderAlert> {
        self.alerts.iter().fold(None, |best: Option<&ProviderAlert>, alert| match best {
            Some(b) if b.alert_level >= alert.alert_level => Some(b),
            _ => Some(alert),
        })
    }
}
