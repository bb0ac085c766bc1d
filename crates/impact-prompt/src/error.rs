//! Error types for prompt operations

use thiserror::Error;

/// Result type for prompt operations
pub type Result<T> = std::result::Result<T, PromptError>;

/// Errors that can occur while building or rendering prompts
#[derive(Error, Debug)]
pub enum PromptError {
    /// Template has no variant for the requested language
    #[error("Template '{name}' not found for language '{language}'")]
    TemplateNotFound { name: String, language: String },

    /// Template source failed to parse
    #[error("Failed to parse template '{name}' for language '{language}': {detail}")]
    TemplateParseFailed {
        name: String,
        language: String,
        detail: String,
    },

    /// Rendering failed, including references to undefined variables
    #[error("Failed to render template '{name}': {detail}")]
    RenderError { name: String, detail: String },

    /// No variants were supplied to the builder
    #[error("No templates provided for '{0}'")]
    NoTemplatesProvided(String),

    /// No language available for the template
    #[error("No language available for template '{0}'")]
    NoLanguageAvailable(String),

    /// Template not registered in registry
    #[error("Template '{0}' not registered")]
    TemplateNotRegistered(String),
}
