//! Trend evaluations reported by the models, and the response parser

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

const ANALYSIS_MARKER: &str = "=== ANALYSIS ===";
const EVALUATION_MARKER: &str = "=== TREND_EVALUATION ===";

/// Alert severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl AlertLevel {
    /// Parse case-insensitively; unknown values map to [`AlertLevel::Low`]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "info" => Self::Info,
            "medium" => Self::Medium,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an evaluation was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Parsed from the model's JSON block
    ConsolidatedEvaluation,
    /// The response had no structured block
    ParsingFallback,
    /// The structured block was malformed
    Error,
}

/// A model's self-reported view of whether the trend is changing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendEvaluation {
    pub change_type: ChangeType,
    pub alert_level: AlertLevel,
    /// Percent, 0 to 100
    pub trend_change_probability: f64,
    pub confidence_level: String,
    pub summary: String,
    pub key_changes: Vec<String>,
    pub probability_reasoning: String,
    /// Probability is at or above the alert threshold
    pub has_changes: bool,
}

impl TrendEvaluation {
    /// Evaluation used when the response has no structured block
    pub fn fallback() -> Self {
        Self {
            change_type: ChangeType::ParsingFallback,
            alert_level: AlertLevel::Low,
            trend_change_probability: 0.0,
            confidence_level: "low".to_string(),
            summary: "Analysis completed".to_string(),
            key_changes: Vec::new(),
            probability_reasoning: "Could not parse structured response".to_string(),
            has_changes: false,
        }
    }

    /// Evaluation used when the structured block is malformed
    pub fn error(detail: impl fmt::Display) -> Self {
        Self {
            change_type: ChangeType::Error,
            summary: format!("Error: {detail}"),
            probability_reasoning: "Parsing error".to_string(),
            ..Self::fallback()
        }
    }

    fn from_json(data: &Value, threshold: f64) -> Self {
        let text = |key: &str, default: &str| {
            data.get(key)
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string()
        };

        let probability = data
            .get("trend_change_probability")
            .map_or(0.0, parse_probability);

        let key_changes = data
            .get("key_changes")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|v| v.as_str().map_or_else(|| v.to_string(), ToString::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            change_type: ChangeType::ConsolidatedEvaluation,
            alert_level: AlertLevel::parse(&text("alert_level", "low")),
            trend_change_probability: probability,
            confidence_level: text("confidence_level", "low"),
            summary: text("summary", "No summary"),
            key_changes,
            probability_reasoning: text("probability_reasoning", "No reasoning"),
            has_changes: probability >= threshold,
        }
    }
}

/// Probability from a JSON number or a string such as `"85%"`, clamped to 0-100
fn parse_probability(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if raw.is_finite() { raw.clamp(0.0, 100.0) } else { 0.0 }
}

/// Split a model response into its analysis text and trend evaluation
///
/// Responses are expected to contain `=== ANALYSIS ===` followed by
/// `=== TREND_EVALUATION ===` and a JSON object. Anything else yields the
/// whole text with a fallback evaluation.
pub fn parse_response(text: &str, threshold: f64) -> (String, TrendEvaluation) {
    let (Some(analysis_at), Some(evaluation_at)) =
        (text.find(ANALYSIS_MARKER), text.find(EVALUATION_MARKER))
    else {
        debug!("Response has no structured markers, using fallback evaluation");
        return (text.to_string(), TrendEvaluation::fallback());
    };

    let after_analysis = &text[analysis_at + ANALYSIS_MARKER.len()..];
    let analysis = after_analysis
        .find(EVALUATION_MARKER)
        .map_or(after_analysis, |end| &after_analysis[..end])
        .trim();

    let trend_section = &text[evaluation_at + EVALUATION_MARKER.len()..];
    let trend_section = trend_section
        .find(EVALUATION_MARKER)
        .map_or(trend_section, |end| &trend_section[..end]);

    let (Some(start), Some(end)) = (trend_section.find('{'), trend_section.rfind('}')) else {
        return (text.to_string(), TrendEvaluation::fallback());
    };
    if end <= start {
        return (text.to_string(), TrendEvaluation::fallback());
    }

    match serde_json::from_str::<Value>(&trend_section[start..=end]) {
        Ok(data) => (analysis.to_string(), TrendEvaluation::from_json(&data, threshold)),
        Err(e) => {
            warn!("Malformed trend evaluation JSON: {}", e);
            (text.to_string(), TrendEvaluation::error(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRUCTURED: &str = r#"Intro text
=== ANALYSIS ===
**MARKET OVERVIEW** Price is testing resistance.

=== TREND_EVALUATION ===
```json
{
    "alert_level": "HIGH",
    "trend_change_probability": 72,
    "confidence_level": "medium",
    "summary": "Bullish reversal forming",
    "key_changes": ["+RD formed", "UT Bot BUY"],
    "probability_reasoning": "Multiple confirmations"
}
```"#;

    #[test]
    fn test_structured_response() {
        let (analysis, eval) = parse_response(STRUCTURED, 60.0);

        assert_eq!(analysis, "**MARKET OVERVIEW** Price is testing resistance.");
        assert_eq!(eval.change_type, ChangeType::ConsolidatedEvaluation);
        assert_eq!(eval.alert_level, AlertLevel::High);
        assert!((eval.trend_change_probability - 72.0).abs() < f64::EPSILON);
        assert_eq!(eval.confidence_level, "medium");
        assert_eq!(eval.key_changes, vec!["+RD formed", "UT Bot BUY"]);
        assert!(eval.has_changes);
    }

    #[test]
    fn test_threshold_controls_has_changes() {
        let (_, eval) = parse_response(STRUCTURED, 80.0);
        assert!(!eval.has_changes);

        let (_, eval) = parse_response(STRUCTURED, 72.0);
        assert!(eval.has_changes);
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let text = "=== ANALYSIS ===\nA\n=== TREND_EVALUATION ===\n{}";
        let (analysis, eval) = parse_response(text, 60.0);

        assert_eq!(analysis, "A");
        assert_eq!(eval.alert_level, AlertLevel::Low);
        assert!(eval.trend_change_probability.abs() < f64::EPSILON);
        assert_eq!(eval.confidence_level, "low");
        assert_eq!(eval.summary, "No summary");
        assert_eq!(eval.probability_reasoning, "No reasoning");
        assert!(eval.key_changes.is_empty());
        assert!(!eval.has_changes);
    }

    #[test]
    fn test_string_probability_is_clamped() {
        let text = r#"=== ANALYSIS ===
A
=== TREND_EVALUATION ===
{"trend_change_probability": "85%"}"#;
        let (_, eval) = parse_response(text, 60.0);
        assert!((eval.trend_change_probability - 85.0).abs() < f64::EPSILON);

        let text = r#"=== ANALYSIS ===
A
=== TREND_EVALUATION ===
{"trend_change_probability": 140}"#;
        let (_, eval) = parse_response(text, 60.0);
        assert!((eval.trend_change_probability - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unstructured_response_falls_back() {
        let (analysis, eval) = parse_response("Just some prose about the chart", 60.0);

        assert_eq!(analysis, "Just some prose about the chart");
        assert_eq!(eval, TrendEvaluation::fallback());
        assert_eq!(eval.summary, "Analysis completed");
    }

    #[test]
    fn test_markers_without_json_fall_back() {
        let text = "=== ANALYSIS ===\nA\n=== TREND_EVALUATION ===\nno json here";
        let (analysis, eval) = parse_response(text, 60.0);

        assert_eq!(analysis, text);
        assert_eq!(eval.change_type, ChangeType::ParsingFallback);
    }

    #[test]
    fn test_malformed_json_is_error() {
        let text = "=== ANALYSIS ===\nA\n=== TREND_EVALUATION ===\n{\"alert_level\": }";
        let (analysis, eval) = parse_response(text, 60.0);

        assert_eq!(analysis, text);
        assert_eq!(eval.change_type, ChangeType::Error);
        assert!(eval.summary.starts_with("Error: "));
        assert_eq!(eval.probability_reasoning, "Parsing error");
        assert!(!eval.has_changes);
    }

    #[test]
    fn test_alert_level_ordering_and_parse() {
        assert!(AlertLevel::Critical > AlertLevel::High);
        assert!(AlertLevel::Low > AlertLevel::Info);
        assert_eq!(AlertLevel::parse("Critical"), AlertLevel::Critical);
        assert_eq!(AlertLevel::parse("critical/high/medium/low"), AlertLevel::Low);
        assert_eq!(AlertLevel::High.to_string(), "high");
    }
}
