//! Chart trend-watch pipeline
//!
//! For each stock symbol this crate picks up a set of chart screenshots,
//! sends them to every enabled vision model, and merges the self-reported
//! trend change probabilities into one verdict:
//!
//! - `screenshots`: expected chart slots, directory source, base64 encoding
//! - `prompts`: analysis and consolidation templates
//! - `analysis`: concurrent provider calls and response parsing
//! - `consensus`: statistics, consolidated decision, final outcome
//! - `report`: HTML and text reports, prior analysis lookup
//! - `alert`: email notifications
//! - `schedule`: market-hours loop
//! - `pipeline`: all of the above for one symbol or a list of symbols

pub mod alert;
pub mod analysis;
pub mod config;
pub mod consensus;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod schedule;
pub mod screenshots;
pub mod symbols;

#[cfg(test)]
mod testing;

pub use alert::{AlertNotifier, EmailNotifier};
pub use analysis::{AlertLevel, ChartAnalyzer, ProviderAnalysis, ProviderKind, TrendEvaluation};
pub use config::WatchConfig;
pub use consensus::{ConsensusOutcome, ConsensusStats, ConsolidatedDecision, Consolidator};
pub use error::{Result, WatchError};
pub use pipeline::{ProviderCheck, RunSummary, SymbolReport, TrendWatch};
pub use schedule::{MarketHours, Scheduler};
pub use screenshots::{ChartKind, DirectorySource, EncodedImage, ScreenshotSet, ScreenshotSource};
pub use symbols::load_symbols;
