//! MiniJinja-based template implementation
//!
//! This module provides a [`JinjaTemplate`] implementation that uses the MiniJinja
//! template engine for variable interpolation and conditional rendering.

use crate::{PromptError, PromptTemplate, Result};
use minijinja::Environment;

/// A prompt template backed by MiniJinja
///
/// # Template Syntax
///
/// The template uses standard Jinja2 syntax:
/// - Variables: `{{ variable }}`
/// - Filters: `{{ name | upper }}`, `{{ prior | truncate_chars(500) }}`
/// - Conditionals: `{% if condition %}...{% endif %}`
/// - Loops: `{% for item in items %}...{% endfor %}`
///
/// Templates are checked for syntax errors at construction time.
pub struct JinjaTemplate {
    name: String,
    source: String,
}

impl JinjaTemplate {
    /// Create a template, validating its syntax
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let source = source.into();

        let env = environment();
        env.template_from_str(&source)
            .map_err(|e| PromptError::Syntax {
                name: name.clone(),
                detail: e.to_string(),
            })?;

        Ok(Self { name, source })
    }
}

/// Environment with the filters every chartwatch prompt may use
fn environment() -> Environment<'static> {
    let mut env = Environment::new();

    env.add_filter("upper", |s: String| s.to_uppercase());
    env.add_filter("lower", |s: String| s.to_lowercase());
    env.add_filter("trim", |s: String| s.trim().to_string());
    env.add_filter("truncate_chars", |s: String, n: usize| {
        s.chars().take(n).collect::<String>()
    });

    env
}

impl PromptTemplate for JinjaTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, vars: &serde_json::Value) -> Result<String> {
        let env = environment();
        let value = minijinja::value::Value::from_serialize(vars);

        env.render_str(&self.source, value)
            .map_err(|e| PromptError::Render {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }

    fn raw_template(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Debug for JinjaTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JinjaTemplate")
            .field("name", &self.name)
            .field("len", &self.source.len())
            .finish()
    }
}
