//! Email decisions from consolidated text, and the local vote fallback

use super::stats::ConsensusStats;
use crate::analysis::{AlertLevel, ProviderAnalysis};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

const YES_PATTERNS: [&str; 8] = [
    "EMAIL ALERT DECISION: YES",
    "EMAIL ALERT DECISION:YES",
    "SEND EMAIL ALERT",
    "EMAIL: YES",
    "ALERT: YES",
    "RECOMMENDATION: SEND EMAIL",
    "SHOULD SEND EMAIL",
    "ALERT RECOMMENDED",
];

const NO_PATTERNS: [&str; 9] = [
    "EMAIL ALERT DECISION: NO",
    "EMAIL ALERT DECISION:NO",
    "DO NOT SEND EMAIL",
    "DON'T SEND EMAIL",
    "EMAIL: NO",
    "ALERT: NO",
    "NO EMAIL NEEDED",
    "NOT ALERT",
    "NO ALERT NEEDED",
];

const BULLISH_KEYWORDS: [&str; 9] = [
    "BUY",
    "STRONG BUY",
    "BULLISH",
    "UPTREND",
    "SIGNAL",
    "ALERT",
    "OPPORTUNITY",
    "REVERSAL UP",
    "BREAKOUT",
];

const BEARISH_KEYWORDS: [&str; 8] = [
    "SELL",
    "STRONG SELL",
    "BEARISH",
    "DOWNTREND",
    "WARNING",
    "CAUTION",
    "REVERSAL DOWN",
    "BREAKDOWN",
];

/// Whether a consolidated decision asks for an email, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDecision {
    pub send: bool,
    pub reason: String,
}

impl EmailDecision {
    fn new(send: bool, reason: impl Into<String>) -> Self {
        Self {
            send,
            reason: reason.into(),
        }
    }
}

/// Read the email decision out of consolidated decision text
///
/// Explicit YES patterns win over explicit NO patterns; without either, a
/// bullish alert or a bearish warning still asks for an email.
pub fn parse_email_decision(text: &str) -> EmailDecision {
    let upper = text.to_uppercase();

    if let Some(pattern) = YES_PATTERNS.iter().find(|p| upper.contains(*p)) {
        info!("Email decision: SEND (matched '{}')", pattern);
        return EmailDecision::new(true, format!("matched '{pattern}'"));
    }

    if let Some(pattern) = NO_PATTERNS.iter().find(|p| upper.contains(*p)) {
        info!("Email decision: DO NOT SEND (matched '{}')", pattern);
        return EmailDecision::new(false, format!("matched '{pattern}'"));
    }

    let bullish = BULLISH_KEYWORDS.iter().filter(|k| upper.contains(*k)).count();
    let bearish = BEARISH_KEYWORDS.iter().filter(|k| upper.contains(*k)).count();

    if (upper.contains("ALERT") || upper.contains("SIGNAL")) && bullish > bearish {
        info!("Email decision: SEND (bullish signals {} vs {})", bullish, bearish);
        return EmailDecision::new(true, "bullish signals with alert keywords");
    }

    if (upper.contains("WARNING") || upper.contains("CAUTION")) && bearish > 0 {
        info!("Email decision: SEND (bearish warnings)");
        return EmailDecision::new(true, "bearish warnings");
    }

    EmailDecision::new(false, "no alert indicators")
}

/// A single provider's vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl TradeAction {
    fn vote(analysis: &ProviderAnalysis) -> Self {
        let eval = &analysis.evaluation;
        if !eval.has_changes {
            return Self::Hold;
        }

        if eval.alert_level >= AlertLevel::High || eval.trend_change_probability > 70.0 {
            Self::Buy
        } else if eval.alert_level <= AlertLevel::Low || eval.trend_change_probability < 30.0 {
            Self::Sell
        } else {
            Self::Hold
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        })
    }
}

/// Majority vote across providers, rendered as a decision block
///
/// A strict majority is required for BUY or SELL; anything else is HOLD.
pub fn local_decision(analyses: &[ProviderAnalysis], stats: &ConsensusStats, symbol: &str) -> String {
    let votes: Vec<TradeAction> = analyses.iter().map(TradeAction::vote).collect();
    let count = |action| votes.iter().filter(|v| **v == action).count();
    let (buy, sell, hold) = (
        count(TradeAction::Buy),
        count(TradeAction::Sell),
        count(TradeAction::Hold),
    );

    let (decision, agreeing) = if buy > sell && buy > hold {
        (TradeAction::Buy, buy)
    } else if sell > buy && sell > hold {
        (TradeAction::Sell, sell)
    } else {
        (TradeAction::Hold, hold)
    };

    let rule = "=".repeat(50);
    let average = stats.average;
    let band = if average > 60.0 {
        format!("High probability ({average:.1}%) of significant trend change")
    } else if average > 40.0 {
        format!("Moderate probability ({average:.1}%) of trend change")
    } else {
        format!("Low probability ({average:.1}%) of trend change")
    };

    let mut text = format!("{rule}\nLOCAL CONSOLIDATED TRADING DECISION FOR {symbol}\n{rule}\n\n");
    text.push_str(&format!("TRADING DECISION: {decision}\n"));
    text.push_str(&format!(
        "Provider Consensus: {agreeing}/{} providers agree\n",
        analyses.len()
    ));
    text.push_str(&format!("Average Probability: {average:.1}%\n\n"));
    text.push_str("TREND CHANGE EVALUATION:\n");
    text.push_str(&band);
    text.push_str("\n\nProvider Breakdown:\n");
    for (analysis, vote) in analyses.iter().zip(&votes) {
        text.push_str(&format!(
            "- {}: {} (probability: {:.1}%)\n",
            analysis.provider.title(),
            vote,
            analysis.evaluation.trend_change_probability
        ));
    }
    text.push_str(&format!("\n{rule}\n"));
    text
}
