//! LLM access for the news impact pipeline
//!
//! - [`LLMProvider`]: chat-completion backends (OpenAI-compatible behind the
//!   `openai` feature)
//! - [`StructuredCompletionEngine`]: the prompt-plus-schema capability the
//!   pipeline consumes, with [`ProviderEngine`] adapting any provider to it
//! - [`LLMError`] and its [`FailureKind`] classification

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod structured;

pub use completion::{
    CompletionRequest, CompletionResponse, JsonSchemaFormat, ResponseFormat, StopReason,
    TokenUsage,
};
pub use error::{FailureKind, LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;
pub use structured::{
    OutputSchema, ProviderEngine, StructuredCompletionEngine, StructuredRequest, decode,
    parse_json_object,
};
