//! File-based template loader
//!
//! This module provides [`FileLoader`] for loading templates from the filesystem.
//! A file named `analysis.jinja` (or `analysis.j2`) becomes the template
//! `analysis`; dots in the stem are kept, so `chart_context.utbot.jinja`
//! becomes `chart_context.utbot`.

use crate::{JinjaTemplate, PromptError, PromptTemplate, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

const EXTENSIONS: [&str; 2] = ["jinja", "j2"];

/// Loads Jinja templates from a directory
#[derive(Debug, Clone)]
pub struct FileLoader {
    base_path: PathBuf,
}

impl FileLoader {
    /// Create a loader rooted at `base_path`
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Directory the loader reads from
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Whether the base directory exists
    pub fn exists(&self) -> bool {
        self.base_path.is_dir()
    }

    /// Load a single template by name
    pub fn load_template(&self, name: &str) -> Result<JinjaTemplate> {
        for ext in EXTENSIONS {
            let path = self.base_path.join(format!("{name}.{ext}"));
            if path.is_file() {
                return Self::read(name, &path);
            }
        }

        Err(PromptError::Load {
            path: self.base_path.join(name).display().to_string(),
            detail: "No template files found".to_string(),
        })
    }

    /// Load every template file in the directory
    pub fn load_all(&self) -> Result<Vec<JinjaTemplate>> {
        let entries = std::fs::read_dir(&self.base_path).map_err(|e| PromptError::Load {
            path: self.base_path.display().to_string(),
            detail: e.to_string(),
        })?;

        let mut templates = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            let Some(name) = template_name(&path) else {
                continue;
            };

            debug!("Loading prompt template '{}' from {}", name, path.display());
            templates.push(Self::read(&name, &path)?);
        }

        templates.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(templates)
    }

    fn read(name: &str, path: &Path) -> Result<JinjaTemplate> {
        let content = std::fs::read_to_string(path).map_err(|e| PromptError::Load {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        JinjaTemplate::new(name, content)
    }
}

/// Template name for a path, if it has a template extension
fn template_name(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if !EXTENSIONS.contains(&ext) {
        return None;
    }
    path.file_stem()?.to_str().map(ToString::to_string)
}
