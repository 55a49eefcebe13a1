//! Prompt errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PromptError>;

#[derive(Error, Debug)]
pub enum PromptError {
    /// Template source does not parse
    #[error("Template '{name}' has a syntax error: {detail}")]
    Syntax { name: String, detail: String },

    /// Rendering failed, e.g. a filter received the wrong type
    #[error("Cannot render template '{name}': {detail}")]
    Render { name: String, detail: String },

    /// No template with this name in the registry
    #[error("No prompt template named '{0}'")]
    Unknown(String),

    /// Override file or directory could not be read
    #[error("Cannot load prompt from '{path}': {detail}")]
    Load { path: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_template() {
        let err = PromptError::Syntax {
            name: "analysis".into(),
            detail: "unexpected end of block".into(),
        };
        assert_eq!(
            err.to_string(),
            "Template 'analysis' has a syntax error: unexpected end of block"
        );
        assert_eq!(
            PromptError::Unknown("consolidation".into()).to_string(),
            "No prompt template named 'consolidation'"
        );
    }
}
