//! Error types for the impact pipeline

use crate::report::PersistError;
use crate::state::PipelineState;
use impact_llm::{FailureKind, LLMError};
use impact_prompt::PromptError;
use std::fmt;
use thiserror::Error;

/// Pipeline stage, used to locate failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// News digest and sentiment
    Summarize,
    /// First-order beneficiary proposal
    PrimaryRecommend,
    /// First-order proposal review
    PrimaryCritique,
    /// Price-based overheat filter
    TechnicalScreen,
    /// Ripple-effect proposal
    SecondaryRecommend,
    /// Ripple-effect review
    SecondaryCritique,
    /// Report persistence
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Summarize => "summarize",
            Stage::PrimaryRecommend => "primary-recommend",
            Stage::PrimaryCritique => "primary-critique",
            Stage::TechnicalScreen => "technical-screen",
            Stage::SecondaryRecommend => "secondary-recommend",
            Stage::SecondaryCritique => "secondary-critique",
            Stage::Persist => "persist",
        };
        f.write_str(label)
    }
}

/// Fatal pipeline failures
///
/// Critic rejections and exhausted retries are not errors; they show up as
/// state flags and warnings.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The run was started without any news
    #[error("no news items supplied")]
    EmptyInput,

    /// A reasoning or critique call failed
    #[error("{stage} failed on attempt {attempt} ({kind}): {source}", kind = .source.kind())]
    Engine {
        stage: Stage,
        attempt: u32,
        #[source]
        source: LLMError,
    },

    /// A prompt could not be rendered
    #[error("prompt for {stage} could not be rendered: {source}")]
    Prompt {
        stage: Stage,
        #[source]
        source: PromptError,
    },

    /// Invalid pipeline configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// A stage ran before the news was summarized
    #[error("{0} reached before the news was summarized")]
    OutOfOrder(Stage),

    /// The pipeline finished but the report could not be stored
    #[error("analysis completed but the report was not persisted: {source}")]
    Persistence {
        state: Box<PipelineState>,
        #[source]
        source: PersistError,
    },
}

impl PipelineError {
    /// Wrap an engine failure with its location
    pub fn engine(stage: Stage, attempt: u32, source: LLMError) -> Self {
        Self::Engine {
            stage,
            attempt,
            source,
        }
    }

    /// Wrap a prompt rendering failure
    pub fn prompt(stage: Stage, source: PromptError) -> Self {
        Self::Prompt { stage, source }
    }

    /// Failure class of an engine error, if this is one
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Engine { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    /// Whether the analysis itself succeeded and only persistence failed
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Price lookup failures
///
/// These never abort a run; the screener turns them into `data_unavailable`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PriceError {
    /// The provider has no series for the identifier
    #[error("no price data for {identifier}: {reason}")]
    Unavailable { identifier: String, reason: String },

    /// The provider could not be reached
    #[error("price provider unreachable: {0}")]
    Transport(String),

    /// The provider answered with data that could not be read
    #[error("malformed price data for {identifier}: {reason}")]
    Malformed { identifier: String, reason: String },
}
