//! First-order and ripple-effect recommendation

use super::schema::{self, RawCandidates, RawRipples};
use super::{StageCall, equity_view, feedback_vars, summary_view};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result, Stage};
use crate::model::{CandidateEquity, EquityCode, MarketSummary, RippleEffect};
use crate::prompts;
use impact_llm::StructuredCompletionEngine;
use impact_prompt::PromptRegistry;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A recommender answer plus the warnings raised while validating it
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal<T> {
    pub items: Vec<T>,
    pub warnings: Vec<String>,
}

/// Proposes equities (primary lane) or ripple effects (secondary lane)
///
/// `feedback` is the lane's rejection history, oldest first. The latest entry
/// is rendered as a mandatory correction and earlier ones as context.
pub struct CandidateRecommender {
    call: StageCall,
}

impl CandidateRecommender {
    pub fn new(
        engine: Arc<dyn StructuredCompletionEngine>,
        prompts: Arc<PromptRegistry>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            call: StageCall::new(engine, prompts, config.recommender),
        }
    }

    /// Propose up to `count` first-order beneficiaries
    #[instrument(skip(self, summary, feedback), fields(feedback = feedback.len()))]
    pub async fn propose_primary(
        &self,
        summary: &MarketSummary,
        count: usize,
        feedback: &[String],
        attempt: u32,
    ) -> Result<Proposal<CandidateEquity>> {
        let (latest, earlier) = feedback_vars(feedback);
        let vars = json!({
            "summary": summary_view(summary),
            "count": count,
            "feedback": latest,
            "previous_feedback": earlier,
        });

        let raw: RawCandidates = self
            .call
            .invoke(
                Stage::PrimaryRecommend,
                attempt,
                prompts::PRIMARY_RECOMMENDER,
                prompts::RECOMMEND_PRIMARY,
                &vars,
                schema::primary_candidates(count),
            )
            .await?;

        let filtered = raw
            .into_candidates(count)
            .map_err(|e| PipelineError::engine(Stage::PrimaryRecommend, attempt, e))?;
        for warning in &filtered.warnings {
            warn!("{warning}");
        }
        info!(proposed = filtered.items.len(), "primary candidates proposed");

        Ok(Proposal {
            items: filtered.items,
            warnings: filtered.warnings,
        })
    }

    /// Propose up to `count` ripple effects
    ///
    /// Related equities matching an `excluded` identifier are dropped.
    #[instrument(skip(self, summary, primary, excluded, feedback), fields(primary = primary.len(), excluded = excluded.len()))]
    pub async fn propose_ripple(
        &self,
        summary: &MarketSummary,
        primary: &[CandidateEquity],
        excluded: &[CandidateEquity],
        count: usize,
        feedback: &[String],
        attempt: u32,
    ) -> Result<Proposal<RippleEffect>> {
        let (latest, earlier) = feedback_vars(feedback);
        let vars = json!({
            "summary": summary_view(summary),
            "count": count,
            "primary": primary.iter().map(equity_view).collect::<Vec<_>>(),
            "excluded": excluded.iter().map(equity_view).collect::<Vec<_>>(),
            "feedback": latest,
            "previous_feedback": earlier,
        });

        let raw: RawRipples = self
            .call
            .invoke(
                Stage::SecondaryRecommend,
                attempt,
                prompts::SECONDARY_RECOMMENDER,
                prompts::RECOMMEND_SECONDARY,
                &vars,
                schema::ripple_effects(count),
            )
            .await?;

        let excluded: HashSet<EquityCode> =
            excluded.iter().map(|e| e.identifier.clone()).collect();
        let filtered = raw
            .into_effects(count, &excluded)
            .map_err(|e| PipelineError::engine(Stage::SecondaryRecommend, attempt, e))?;
        for warning in &filtered.warnings {
            warn!("{warning}");
        }
        info!(proposed = filtered.items.len(), "ripple effects proposed");

        Ok(Proposal {
            items: filtered.items,
            warnings: filtered.warnings,
        })
    }
}
