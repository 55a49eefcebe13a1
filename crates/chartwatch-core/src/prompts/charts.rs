//! Indicator documentation for each chart window

use crate::screenshots::ChartKind;
use chartwatch_prompt::{JinjaTemplate, Result};

/// Template name for a chart's context block
pub fn chart_context_name(kind: ChartKind) -> String {
    format!("chart_context.{}", kind.key())
}

/// Create the context template for one chart kind
pub fn chart_context(kind: ChartKind) -> Result<JinjaTemplate> {
    let source = match kind {
        ChartKind::TrendAnalysis => TREND_ANALYSIS,
        ChartKind::HeikenAshi => HEIKEN_ASHI,
        ChartKind::VolumeLayout => VOLUME_LAYOUT,
        ChartKind::UtBot => UT_BOT,
        ChartKind::Workspace => WORKSPACE,
        ChartKind::VolumeProfile => VOLUME_PROFILE,
    };
    JinjaTemplate::new(chart_context_name(kind), source)
}

const TREND_ANALYSIS: &str = r"CHART CONTEXT - Trend Analysis Window:
This chart displays LuxAlgo technical indicators. Use the following documentation to analyze it:
- LuxAlgo Signals & Overlays: https://docs.luxalgo.com/docs/algos/signals-overlays/signals
- LuxAlgo Price Action Concepts: https://docs.luxalgo.com/docs/algos/price-action-concepts/introduction

Pay special attention to:
- Signal Quality (Strong Buy/Sell signals)
- Price Action Concepts (Support/Resistance levels, market structure)
- Overlay indicators (trend direction, strength)
- Signal confirmations and divergences
";

const HEIKEN_ASHI: &str = r"CHART CONTEXT - Smoothed Heiken Ashi Candles Window:
This chart displays the following technical indicators:
- Smoothed Heiken Ashi Candles: Trend-following candles that smooth out price action
- AlgoAlpha HEMA Trend: Hybrid Exponential Moving Average for trend identification
- Divergence Indicators: Price vs indicator divergences for reversal signals
- Volume Footprint: Order flow analysis showing buy/sell volume at each price level

Pay special attention to:
- Smoothed Heiken Ashi candle colors (bullish/bearish trends)
- HEMA trend direction and crossovers
- Divergence signals (bullish/bearish divergences)
- Trend strength and momentum
- Reversal patterns indicated by divergences
- Volume Footprint Analysis:
  * Absorption: Large volume at price level with minimal price movement indicates strong institutional support/resistance
  * Exhaustion: Decreasing volume as price extends signals trend weakness and potential reversal
  * Bid/ask imbalances at key levels for order flow confirmation
";

const VOLUME_LAYOUT: &str = r"CHART CONTEXT - Volume Layout Window:
This chart displays the following technical indicators:
- LuxAlgo Money Flow Profile: Shows institutional money flow and buying/selling pressure
- CVD Divergence Oscillator: Cumulative Volume Delta divergences for trend reversals
- SQZMOM_LB: Squeeze Momentum indicator with LazyBear modifications
- MA Distance with StdDev Bands: Moving average distance with standard deviation bands

Pay special attention to:
- Money flow profile (accumulation/distribution zones)
- CVD divergence signals (bullish/bearish divergences)
- SQZMOM_LB squeeze conditions and momentum direction
- MA distance from price and standard deviation extremes
- **CRITICAL**: If a +RD (Positive Reversal Divergence) or -RD (Negative Reversal Divergence) was formed recently, clearly indicate this in the analysis as it signals potential trend reversal
- Volume patterns confirming or diverging from price action
";

const UT_BOT: &str = r"CHART CONTEXT - UT Bot -Lorentzian Window:
This chart displays the following technical indicators:
- UT Bot Alert: Trend-following indicator with BUY/SELL signals based on ATR trailing stop
- Lorentzian Classification: Machine learning-based trend classification using Lorentzian distance
- Signal Line: Dynamic support/resistance based on ATR
- Trend Direction: Color-coded candles showing bullish (green) or bearish (red) trend

Pay special attention to:
- UT Bot BUY/SELL signals (triangles or arrows marking entry points)
- Lorentzian classification predictions (bullish/bearish probability)
- Signal line crossovers (price crossing above/below the UT Bot line)
- Trend color changes (transition from red to green or vice versa)
- Confluence of UT Bot signals with Lorentzian predictions
- Recent signal history and signal frequency
- ATR-based stop loss levels indicated by the trailing line
";

const WORKSPACE: &str = r"CHART CONTEXT - Symbolik Workspace Window:
This chart displays the following technical indicators:
- ATM Chart Lines: Algorithmic Trading Model support/resistance lines
- ATM Elliott Projections: Elliott Wave price projections and targets
- ATM Elliott Waves: Elliott Wave count and structure analysis
- ATM Pressure Alert: Market pressure and momentum alerts
- TKT Analysis: Technical Knowledge Trading analysis framework
- TKT Score: Quantified trading opportunity score
- Variable Aggressive Sequential (Demark Sequential): TD Sequential buy/sell setup and countdown signals

Pay special attention to:
- **ATM Chart Lines alignment**: If the current price is sitting on or near an ATM chart line, clearly indicate this in the analysis as it represents a key support/resistance level
- ATM Elliott Wave count and current position in the wave structure
- ATM Elliott projections for price targets
- ATM Pressure alerts (bullish/bearish pressure signals)
- TKT analysis signals and overall market structure
- TKT score value (higher scores indicate stronger opportunities)
- Variable Aggressive Sequential setup and countdown numbers (9s and 13s are critical)
- Demark Sequential buy/sell signals at exhaustion points
";

const VOLUME_PROFILE: &str = r"CHART CONTEXT - Volume Profile Window:
This chart displays the following technical indicators:
- RVOL (Relative Volume): Volume relative to average
- VOLD Ratio: Volume delta ratio
- MS (Matrix Mod): Overbought/oversold conditions
- TTOB Order Blocks: Trapped trader order blocks

Pay special attention to:
- RVOL levels (high RVOL confirms price moves)
- VOLD ratio for buying/selling pressure
- MS overbought/oversold conditions
- Order block support/resistance zones
";
