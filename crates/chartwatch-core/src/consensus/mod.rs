//! Merging provider analyses into one verdict per symbol
//!
//! - `stats`: average, range and alert collection
//! - `decision`: email decision parsing and the local majority vote
//! - `consolidator`: model-written consolidated decision
//! - `outcome`: the final alert/no-alert verdict

mod consolidator;
mod decision;
mod outcome;
mod stats;

pub use consolidator::{ConsolidatedDecision, Consolidator, DecisionSource};
pub use decision::{EmailDecision, TradeAction, local_decision, parse_email_decision};
pub use outcome::ConsensusOutcome;
pub use stats::{ConsensusStats, ProviderAlert};
