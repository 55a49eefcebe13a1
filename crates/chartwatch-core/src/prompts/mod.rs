//! Prompt templates for chart analysis
//!
//! Templates are organized into:
//! - `charts`: one indicator-documentation block per chart kind
//! - `analysis`: the per-provider analysis prompt and the consolidation prompt
//!
//! Every built-in template can be replaced by a file of the same name in
//! `PROMPTS_DIR` (see [`load_overrides`]).

mod analysis;
mod charts;

pub use analysis::*;
pub use charts::*;

use crate::screenshots::ChartKind;
use chartwatch_prompt::{FileLoader, PromptRegistry, PromptTemplate, Result};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::{info, warn};

/// Register all built-in prompts with the given registry
pub fn register_prompts(registry: &PromptRegistry) -> Result<()> {
    for kind in ChartKind::ALL {
        registry.register(chart_context(kind)?);
    }

    registry.register(analysis_prompt()?);
    registry.register(consolidation_prompt()?);

    Ok(())
}

/// Replace built-in prompts with the templates found in `dir`
///
/// A missing directory is not an error. Returns the number of templates
/// loaded.
pub fn load_overrides(registry: &PromptRegistry, dir: &Path) -> Result<usize> {
    let loader = FileLoader::new(dir);
    if !loader.exists() {
        warn!("Prompt directory {} does not exist, using built-in prompts", dir.display());
        return Ok(0);
    }

    let templates = loader.load_all()?;
    let count = templates.len();
    for template in templates {
        let name = template.name().to_string();
        if registry.register(template) {
            info!("Prompt '{}' overridden from {}", name, dir.display());
        } else {
            info!("Prompt '{}' added from {}", name, dir.display());
        }
    }
    Ok(count)
}

/// Registry with the built-in prompts plus any overrides
pub fn build_registry(overrides: Option<&Path>) -> Result<PromptRegistry> {
    let registry = PromptRegistry::new();
    register_prompts(&registry)?;
    if let Some(dir) = overrides {
        load_overrides(&registry, dir)?;
    }
    Ok(registry)
}

/// Render the analysis prompt for a set of charts
///
/// Chart contexts are concatenated in [`ChartKind::ALL`] order for the kinds
/// that are present.
pub fn render_analysis_prompt(
    registry: &PromptRegistry,
    symbol: &str,
    kinds: &[ChartKind],
    prior: Option<&str>,
    threshold: f64,
) -> Result<String> {
    let mut chart_context = String::new();
    for kind in ChartKind::ALL.into_iter().filter(|k| kinds.contains(k)) {
        chart_context.push_str(&registry.render(&chart_context_name(kind), &json!({}))?);
        chart_context.push_str("\n\n");
    }

    registry.render(
        ANALYSIS,
        &json!({
            "num_charts": kinds.len(),
            "symbol": symbol,
            "chart_context": chart_context,
            "prior": prior,
            "threshold": threshold.to_string(),
        }),
    )
}

/// One provider's text in the consolidation prompt
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidationSection<'a> {
    /// Upper-case heading, e.g. `CLAUDE`
    pub name: String,
    /// Display name, e.g. `Claude`
    pub title: &'a str,
    pub text: &'a str,
}

/// Render the consolidation prompt
pub fn render_consolidation_prompt(
    registry: &PromptRegistry,
    symbol: &str,
    sections: &[ConsolidationSection<'_>],
    prior: Option<&str>,
) -> Result<String> {
    registry.render(
        CONSOLIDATION,
        &json!({
            "symbol": symbol,
            "providers": sections,
            "prior": prior,
        }),
    )
}
