//! Chart analysis and multi-provider consolidation templates

use chartwatch_prompt::{JinjaTemplate, Result};

pub const ANALYSIS: &str = "analysis";
pub const CONSOLIDATION: &str = "consolidation";

/// Create the chart analysis template
///
/// Variables: `num_charts`, `symbol`, `chart_context`, `prior` (optional),
/// `threshold`.
pub fn analysis_prompt() -> Result<JinjaTemplate> {
    JinjaTemplate::new(ANALYSIS, ANALYSIS_SOURCE)
}

/// Create the consolidation template
///
/// Variables: `symbol`, `providers` (list of `{name, title, text}`),
/// `prior` (optional).
pub fn consolidation_prompt() -> Result<JinjaTemplate> {
    JinjaTemplate::new(CONSOLIDATION, CONSOLIDATION_SOURCE)
}

const ANALYSIS_SOURCE: &str = r#"You are an expert stock market analyst. Analyze these {{ num_charts }} chart screenshots{% if symbol %} for {{ symbol }}{% endif %}.

CRITICAL INSTRUCTION: Only analyze what you can clearly see in the screenshots. If a chart window appears blank, contains no data, or is not loaded properly, explicitly state "Chart not loaded" or "No data visible" for that window. DO NOT make assumptions or provide analysis for charts that are not visible or contain no data.

IMPORTANT: Provide a COMPREHENSIVE and DETAILED analysis. Each section should be thorough with specific observations from each chart. Do not summarize or abbreviate - include all relevant details you can observe.

{{ chart_context }}
ANALYSIS FORMAT (provide detailed content for each section):

**MARKET OVERVIEW** (2-3 sentences)
Current price, timeframe, and overall market condition.

**KEY VISIBLE INDICATORS**
Provide DETAILED analysis for each chart. List specific indicators visible with their current readings and interpretations:
- For Trend Analysis chart: LuxAlgo signals, price action concepts, overlays - describe specific signal types, colors, and what they indicate
- For Smoothed Heiken Ashi chart: Heiken Ashi candles, HEMA trend, divergences - describe candle colors, trend direction, any divergence signals
- For Volume Layout chart: Money flow profile, CVD divergence, SQZMOM_LB, MA distance with StdDev bands, +RD/-RD signals - describe each indicator's current state
- For UT Bot -Lorentzian chart: UT Bot BUY/SELL signals, Lorentzian classification, signal line position, trend direction - describe signal types, colors, and ML predictions
- For Symbolik Workspace chart: ATM chart lines, ATM Elliott Waves/Projections, ATM Pressure alerts, TKT analysis/score, Variable Aggressive Sequential (Demark) - describe wave counts, projections, and sequential numbers
- Moving averages, oscillators, volume data, support/resistance levels - include specific price levels where visible

**CRITICAL SIGNALS**
Most important actionable signals (include any +RD or -RD formations, MS overbought/oversold conditions, ATM chart line alignments, Demark Sequential 9s or 13s if present). Be specific about what you see and why it matters.

**TRADING DECISION**
Clear BUY/SELL/HOLD with detailed rationale based on the indicators analyzed above.

**TREND CHANGE EVALUATION**
{% if prior %}
Compare with prior analysis and evaluate changes.

Prior: {{ prior | truncate_chars(500) }}...

**RESPONSE FORMAT:**
=== ANALYSIS ===
[Your analysis here]

=== TREND_EVALUATION ===
{
    "alert_level": "critical/high/medium/low",
    "trend_change_probability": 85,
    "confidence_level": "very_high/high/medium/low",
    "summary": "Brief explanation",
    "key_changes": ["change1", "change2"],
    "probability_reasoning": "Why this probability"
}

Rules: Send email only if probability >= {{ threshold }}%
{% else %}
This is the INITIAL ANALYSIS.

=== ANALYSIS ===
[Your analysis]

=== TREND_EVALUATION ===
{
    "alert_level": "info",
    "trend_change_probability": 0,
    "confidence_level": "high",
    "summary": "Initial analysis - no prior data",
    "key_changes": [],
    "probability_reasoning": "First analysis session"
}
{% endif %}"#;

const CONSOLIDATION_SOURCE: &str = r"You are an expert financial analyst tasked with creating a consolidated trading decision based on analyses from multiple AI providers.

STOCK SYMBOL: {{ symbol }}

{% for p in providers %}{{ p.name }} ANALYSIS:
{{ p.text }}

{% endfor %}
{% if prior %}
PRIOR ANALYSIS FOR COMPARISON:
{{ prior | truncate_chars(1000) }}...

TREND CHANGE EVALUATION REQUIRED:
Compare the current analyses above with the prior analysis to evaluate if there are significant changes or trend shifts.
{% else %}
INITIAL ANALYSIS:
This is the first analysis for this symbol, so focus on current state evaluation.
{% endif %}

Based on these comprehensive analyses, generate a consolidated trading decision with the following format:

==================================================
CONSOLIDATED TRADING DECISION FOR {{ symbol }}
==================================================

TRADING DECISION: [BUY/SELL/HOLD]
Consensus Assessment: [Describe agreement/disagreement between providers]
Overall Confidence: [Provide a confidence percentage 0-100%]

TREND CHANGE EVALUATION:
[Synthesize the trend change probability from all analyses]
[Provide consolidated probability assessment]
[Explain key factors driving the trend evaluation]

CRITICAL FACTORS:
- [List 3-5 most important technical factors from all analyses]
- [Highlight any conflicting signals between providers]
- [Note volume, momentum, and support/resistance levels]

RISK ASSESSMENT:
- Upside Potential: [Based on resistance levels and bullish signals]
- Downside Risk: [Based on support levels and bearish signals]
- Stop Loss Recommendation: [If applicable]

PROVIDER SYNTHESIS:
{% for p in providers %}- {{ p.title }} Focus: [Summarize key points from {{ p.title }}]
{% endfor %}- Agreement Areas: [Where providers align]
- Disagreement Areas: [Where providers differ]

EMAIL ALERT DECISION:
Based on the analysis above, determine if an email alert should be sent.
Consider:
- Trend change probability (higher probability = more likely to send)
- Alert levels from all providers
- Significance of changes detected
- Trading decision confidence

Clearly state: EMAIL ALERT DECISION: YES or EMAIL ALERT DECISION: NO

==================================================

Instructions:
1. Synthesize all analyses into a coherent trading decision
2. Highlight areas of agreement and disagreement
3. Provide specific price targets and risk levels when mentioned
4. Be objective and balanced in your assessment
5. Focus on actionable trading insights
6. Email alerts should be sent for significant changes that traders need to act on
";
