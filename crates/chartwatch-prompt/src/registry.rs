//! Named prompt templates shared across concurrent provider calls
//!
//! Registering under an existing name replaces the template. Built-in prompts
//! are registered first and on-disk overrides afterwards, so overrides win.

use crate::{PromptError, PromptTemplate, Result};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Thread-safe name → template map, iterated in name order
#[derive(Default)]
pub struct PromptRegistry {
    templates: RwLock<BTreeMap<String, Arc<dyn PromptTemplate>>>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template; returns `true` if it replaced one with the same name
    pub fn register<T: PromptTemplate + 'static>(&self, template: T) -> bool {
        let name = template.name().to_string();
        match self.templates.write() {
            Ok(mut templates) => templates.insert(name, Arc::new(template)).is_some(),
            Err(_) => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PromptTemplate>> {
        self.templates.read().ok()?.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Render the template registered as `name`
    pub fn render(&self, name: &str, vars: &serde_json::Value) -> Result<String> {
        let template = self
            .get(name)
            .ok_or_else(|| PromptError::Unknown(name.to_string()))?;
        let rendered = template.render(vars)?;
        debug!("Rendered prompt '{}' ({} chars)", name, rendered.len());
        Ok(rendered)
    }

    /// Registered names, sorted
    pub fn list(&self) -> Vec<String> {
        self.templates
            .read()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.templates.read().map_or(0, |t| t.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for PromptRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptRegistry")
            .field("templates", &self.list())
            .finish()
    }
}
