//! Reasoning stages
//!
//! Each stage renders its prompts, makes one structured call and decodes the
//! answer. Stages hold no run state: they read what they are given and return
//! a value for the orchestrator to merge.

mod critic;
mod recommender;
pub mod schema;
mod summarizer;

pub use critic::Critic;
pub use recommender::{CandidateRecommender, Proposal};
pub use summarizer::SentimentSummarizer;

use crate::config::EngineProfile;
use crate::error::{PipelineError, Result, Stage};
use crate::model::{CandidateEquity, MarketSummary};
use impact_llm::{OutputSchema, StructuredCompletionEngine, StructuredRequest, decode};
use impact_prompt::PromptRegistry;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

/// Engine, prompts and sampling shared by one stage
#[derive(Clone)]
pub(crate) struct StageCall {
    engine: Arc<dyn StructuredCompletionEngine>,
    prompts: Arc<PromptRegistry>,
    profile: EngineProfile,
}

impl StageCall {
    pub(crate) fn new(
        engine: Arc<dyn StructuredCompletionEngine>,
        prompts: Arc<PromptRegistry>,
        profile: EngineProfile,
    ) -> Self {
        Self {
            engine,
            prompts,
            profile,
        }
    }

    /// Render `system` and `user` templates, call the engine, decode into `T`
    pub(crate) async fn invoke<T: DeserializeOwned>(
        &self,
        stage: Stage,
        attempt: u32,
        system: &str,
        user: &str,
        vars: &Value,
        schema: OutputSchema,
    ) -> Result<T> {
        let system = self
            .prompts
            .render(system, &json!({}))
            .map_err(|e| PipelineError::prompt(stage, e))?;
        let prompt = self
            .prompts
            .render(user, vars)
            .map_err(|e| PipelineError::prompt(stage, e))?;

        let schema_name = schema.name.clone();
        let request = StructuredRequest {
            system,
            prompt,
            schema,
            temperature: self.profile.temperature,
            max_tokens: self.profile.max_tokens,
        };

        debug!(%stage, attempt, engine = self.engine.name(), schema = %schema_name, "calling engine");
        let value = self
            .engine
            .complete(request)
            .await
            .map_err(|e| PipelineError::engine(stage, attempt, e))?;

        decode(&schema_name, value).map_err(|e| PipelineError::engine(stage, attempt, e))
    }
}

/// Summary fields as the prompt templates see them
pub(crate) fn summary_view(summary: &MarketSummary) -> Value {
    json!({
        "digest": summary.digest(),
        "sentiment_score": summary.sentiment_score(),
        "sentiment_label": summary.sentiment_label(),
        "keywords": summary.keywords(),
        "issue_category": summary.issue_category(),
    })
}

/// Equity fields as the prompt templates see them
pub(crate) fn equity_view(equity: &CandidateEquity) -> Value {
    json!({
        "identifier": equity.identifier,
        "name": equity.display_name,
        "rationale": equity.rationale,
        "confidence": equity.confidence,
        "expected_trend": equity.expected_trend,
        "technical_status": equity.technical_status(),
    })
}

/// Split a feedback history into the latest entry and everything before it
pub(crate) fn feedback_vars(history: &[String]) -> (Value, Value) {
    match history.split_last() {
        Some((latest, earlier)) => (json!(latest), json!(earlier)),
        None => (Value::Null, json!([])),
    }
}
