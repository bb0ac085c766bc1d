//! Error types for LLM operations

use std::fmt;
use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// The model answered, but not in the requested shape
    #[error("Output does not conform to schema '{schema}': {detail}")]
    SchemaViolation { schema: String, detail: String },

    /// The model declined to answer
    #[error("Model refused the request: {0}")]
    Refusal(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Coarse classification of an [`LLMError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Engine unreachable, throttled or answering garbage at the protocol level
    Transport,
    /// Engine answered with content that does not match the requested schema
    SchemaViolation,
    /// Engine declined to answer
    Refusal,
    /// Credentials, model name or request parameters are wrong
    Configuration,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Transport => "transport",
            Self::SchemaViolation => "schema-violation",
            Self::Refusal => "refusal",
            Self::Configuration => "configuration",
        };
        f.write_str(label)
    }
}

impl LLMError {
    /// Build a [`LLMError::SchemaViolation`]
    pub fn schema_violation(schema: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::SchemaViolation {
            schema: schema.into(),
            detail: detail.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::RequestFailed(_)
            | Self::RateLimitExceeded(_)
            | Self::SerializationError(_)
            | Self::HttpError(_)
            | Self::UnexpectedResponse(_) => FailureKind::Transport,
            Self::SchemaViolation { .. } => FailureKind::SchemaViolation,
            Self::Refusal(_) => FailureKind::Refusal,
            Self::AuthenticationFailed
            | Self::InvalidRequest(_)
            | Self::ModelNotFound(_)
            | Self::ConfigurationError(_) => FailureKind::Configuration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            LLMError::RequestFailed("reset".into()).kind(),
            FailureKind::Transport
        );
        assert_eq!(
            LLMError::schema_violation("market_summary", "missing digest").kind(),
            FailureKind::SchemaViolation
        );
        assert_eq!(
            LLMError::Refusal("policy".into()).kind(),
            FailureKind::Refusal
        );
        assert_eq!(
            LLMError::AuthenticationFailed.kind(),
            FailureKind::Configuration
        );
    }

    #[test]
    fn test_schema_violation_display() {
        let err = LLMError::schema_violation("critique", "expected boolean");
        assert_eq!(
            err.to_string(),
            "Output does not conform to schema 'critique': expected boolean"
        );
        assert_eq!(FailureKind::SchemaViolation.to_string(), "schema-violation");
    }
}
