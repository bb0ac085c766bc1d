//! Proposal review for both lanes

use super::schema::{self, RawCritique};
use super::{StageCall, equity_view, summary_view};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::model::{CandidateEquity, CritiqueResult, MarketSummary, RippleEffect};
use crate::prompts;
use crate::retry::Lane;
use impact_llm::StructuredCompletionEngine;
use impact_prompt::PromptRegistry;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, instrument};

/// Reviews a proposal and returns a verdict with feedback
///
/// The primary lane checks code validity, direct causality, restraint and
/// first-order directness. The secondary lane checks chain clarity,
/// plausibility, unjustified leaps and the related equities.
pub struct Critic {
    call: StageCall,
}

impl Critic {
    pub fn new(
        engine: Arc<dyn StructuredCompletionEngine>,
        prompts: Arc<PromptRegistry>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            call: StageCall::new(engine, prompts, config.critic),
        }
    }

    /// Review a first-order candidate list
    pub async fn review_primary(
        &self,
        summary: &MarketSummary,
        candidates: &[CandidateEquity],
        attempt: u32,
    ) -> Result<CritiqueResult> {
        let vars = json!({
            "summary": summary_view(summary),
            "candidates": candidates.iter().map(equity_view).collect::<Vec<_>>(),
        });
        self.review(Lane::Primary, &vars, attempt).await
    }

    /// Review ripple effects against the retained first-order list
    pub async fn review_ripple(
        &self,
        summary: &MarketSummary,
        primary: &[CandidateEquity],
        effects: &[RippleEffect],
        attempt: u32,
    ) -> Result<CritiqueResult> {
        let effects: Vec<Value> = effects
            .iter()
            .map(|effect| {
                json!({
                    "sector": effect.sector,
                    "causal_chain": effect.causal_chain,
                    "impact_level": effect.impact_level,
                    "trend_direction": effect.trend_direction,
                    "related_equities": effect.related_equities.iter().map(equity_view).collect::<Vec<_>>(),
                })
            })
            .collect();
        let vars = json!({
            "summary": summary_view(summary),
            "primary": primary.iter().map(equity_view).collect::<Vec<_>>(),
            "effects": effects,
        });
        self.review(Lane::Secondary, &vars, attempt).await
    }

    #[instrument(skip(self, vars))]
    async fn review(&self, lane: Lane, vars: &Value, attempt: u32) -> Result<CritiqueResult> {
        let (system, user, schema_name) = match lane {
            Lane::Primary => (
                prompts::PRIMARY_CRITIC,
                prompts::CRITIQUE_PRIMARY,
                schema::PRIMARY_CRITIQUE,
            ),
            Lane::Secondary => (
                prompts::SECONDARY_CRITIC,
                prompts::CRITIQUE_SECONDARY,
                schema::SECONDARY_CRITIQUE,
            ),
        };
        let stage = lane.critique_stage();

        let raw: RawCritique = self
            .call
            .invoke(stage, attempt, system, user, vars, schema::critique(schema_name))
            .await?;
        let verdict = raw
            .into_result(schema_name)
            .map_err(|e| PipelineError::engine(stage, attempt, e))?;

        info!(
            accepted = verdict.accepted,
            confidence = verdict.confidence,
            issues = verdict.issues.len(),
            "critique returned"
        );
        Ok(verdict)
    }
}
