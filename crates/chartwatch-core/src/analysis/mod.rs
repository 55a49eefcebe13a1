//! Per-provider chart analysis
//!
//! - `providers`: the hosted model families and their HTTP clients
//! - `evaluation`: the trend evaluation each model reports, and its parser
//! - `analyzer`: concurrent fan-out of one prompt to every enabled provider

mod analyzer;
mod evaluation;
mod providers;

pub use analyzer::{ChartAnalyzer, ProviderAnalysis};
pub use evaluation::{AlertLevel, ChangeType, TrendEvaluation, parse_response};
pub use providers::{ProviderKind, build_provider};
