//! Prompt template management for chartwatch
//!
//! This crate provides the template layer used to build the chart-analysis
//! and consolidation prompts sent to the LLM providers.
//!
//! # Features
//!
//! - **Variable interpolation**: Jinja2 syntax (`{{ variable }}`) via MiniJinja
//! - **Template registry**: Centralized, thread-safe template lookup
//! - **File overrides**: Load `{name}.jinja` files from a directory and replace
//!   built-in templates without recompiling
//!
//! # Quick Start
//!
//! ```
//! use chartwatch_prompt::{JinjaTemplate, PromptRegistry};
//! use serde_json::json;
//!
//! let registry = PromptRegistry::new();
//! registry.register(JinjaTemplate::new("analyzer", "Analyze {{ symbol }}").unwrap());
//!
//! let prompt = registry.render("analyzer", &json!({ "symbol": "QBTS" })).unwrap();
//! assert_eq!(prompt, "Analyze QBTS");
//! ```

mod error;
mod jinja;
mod loader;
mod registry;
mod template;

pub use error::{PromptError, Result};
pub use jinja::JinjaTemplate;
pub use loader::FileLoader;
pub use registry::PromptRegistry;
pub use template::PromptTemplate;
