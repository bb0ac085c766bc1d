//! Structured-output completion
//!
//! A [`StructuredCompletionEngine`] takes a prompt plus an [`OutputSchema`] and
//! returns a JSON value shaped by that schema, or a typed [`LLMError`]. The
//! pipeline only ever talks to this capability; [`ProviderEngine`] adapts any
//! chat [`LLMProvider`] to it.

use crate::{CompletionRequest, LLMError, LLMProvider, Message, Result, StopReason};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// A named JSON schema the engine must answer with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Schema name, also used in error messages
    pub name: String,
    /// JSON Schema document
    pub schema: serde_json::Value,
    /// Ask the provider to enforce the schema exactly
    ///
    /// Strict mode forbids optional properties on OpenAI, so schemas with
    /// defaulted fields leave this off.
    pub strict: bool,
}

impl OutputSchema {
    /// Create a non-strict schema
    pub fn new(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            schema,
            strict: false,
        }
    }

    /// Enable strict enforcement
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

/// One structured-output call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRequest {
    /// System prompt
    pub system: String,
    /// User prompt
    pub prompt: String,
    /// Required output shape
    pub schema: OutputSchema,
    /// Sampling temperature
    pub temperature: f32,
    /// Generation limit
    pub max_tokens: usize,
}

/// Capability: prompt plus schema in, schema-conformant JSON out
#[async_trait]
pub trait StructuredCompletionEngine: Send + Sync {
    /// Run one structured completion
    async fn complete(&self, request: StructuredRequest) -> Result<serde_json::Value>;

    /// Engine name for logs
    fn name(&self) -> &str;
}

/// Decode an engine answer into a typed value
///
/// Shape mismatches become [`LLMError::SchemaViolation`].
pub fn decode<T: DeserializeOwned>(schema: &str, value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| LLMError::schema_violation(schema, e.to_string()))
}

/// [`StructuredCompletionEngine`] backed by a chat-completion provider
pub struct ProviderEngine {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl ProviderEngine {
    /// Wrap a provider, sending every request to `model`
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Model this engine targets
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl StructuredCompletionEngine for ProviderEngine {
    #[instrument(skip(self, request), fields(provider = self.provider.name(), model = %self.model, schema = %request.schema.name))]
    async fn complete(&self, request: StructuredRequest) -> Result<serde_json::Value> {
        let schema_name = request.schema.name.clone();

        let completion = CompletionRequest::builder(&self.model)
            .system(request.system)
            .add_message(Message::user(request.prompt))
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .json_schema(
                request.schema.name,
                request.schema.schema,
                request.schema.strict,
            )
            .build();

        let response = self.provider.complete(completion).await?;
        debug!(
            stop_reason = ?response.stop_reason,
            tokens = response.usage.total(),
            "structured completion returned"
        );

        match response.stop_reason {
            StopReason::Refusal => {
                return Err(LLMError::Refusal(response.message.content));
            }
            StopReason::MaxTokens => {
                warn!("completion hit the token limit; output is likely truncated");
            }
            StopReason::EndTurn | StopReason::StopSequence => {}
        }

        parse_json_object(&schema_name, response.message.text())
    }

    fn name(&self) -> &str {
        self.provider.name()
    }
}

/// Parse model text as a JSON object, tolerating a Markdown code fence
pub fn parse_json_object(schema: &str, text: &str) -> Result<serde_json::Value> {
    let cleaned = strip_code_fence(text);
    if cleaned.is_empty() {
        return Err(LLMError::schema_violation(schema, "empty response"));
    }

    let value: serde_json::Value = serde_json::from_str(cleaned)
        .map_err(|e| LLMError::schema_violation(schema, format!("invalid JSON: {e}")))?;

    if !value.is_object() {
        return Err(LLMError::schema_violation(
            schema,
            "top-level value is not an object",
        ));
    }

    Ok(value)
}

fn strip_code_fence(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
