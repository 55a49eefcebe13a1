//! Core prompt template trait
//!
//! This module defines the [`PromptTemplate`] trait that all template implementations must follow.

use crate::Result;

/// Core trait for prompt templates
///
/// This trait is dyn-compatible, using `serde_json::Value` for variables instead of generics,
/// so the registry can hold built-in and file-loaded templates side by side.
pub trait PromptTemplate: Send + Sync {
    /// Get the template name/identifier
    fn name(&self) -> &str;

    /// Render the template with variables
    fn render(&self, vars: &serde_json::Value) -> Result<String>;

    /// Get raw template source (for debugging/inspection)
    fn raw_template(&self) -> &str;
}
