//! Fixtures shared by unit tests

use crate::analysis::{AlertLevel, ChangeType, ProviderAnalysis, ProviderKind, TrendEvaluation};

/// Parsed analysis for `provider` with the given probability and alert level
pub(crate) fn analysis(
    provider: ProviderKind,
    probability: f64,
    level: AlertLevel,
    threshold: f64,
) -> ProviderAnalysis {
    ProviderAnalysis {
        provider,
        model: "test-model".into(),
        analysis_text: format!("{} view", provider.title()),
        evaluation: TrendEvaluation {
            change_type: ChangeType::ConsolidatedEvaluation,
            alert_level: level,
            trend_change_probability: probability,
            confidence_level: "medium".into(),
            summary: format!("{} summary", provider.name()),
            key_changes: vec![format!("{} change", provider.name())],
            probability_reasoning: "because".into(),
            has_changes: probability >= threshold,
        },
        raw_len: 100,
    }
}
