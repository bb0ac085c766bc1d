//! News impact analysis pipeline
//!
//! Turns a batch of news items into a validated list of first-order
//! beneficiary equities and second-order ripple effects:
//!
//! - A summarizer condenses the news into a digest, sentiment and issue category
//! - A recommender proposes first-order beneficiaries, reviewed by a critic
//!   with bounded retries and feedback
//! - A technical screener drops candidates whose price already looks overheated
//!   (RSI, disparity against MA20, Bollinger bands)
//! - A second recommend/critique lane proposes ripple effects, never naming the
//!   screened-out equities
//! - A report draft is built from the final state and handed to a
//!   [`ReportAssembler`]
//!
//! # Architecture
//!
//! [`Orchestrator`] drives a fixed phase machine over an immutable
//! [`PipelineState`]. Each phase returns a [`StateDelta`] that is merged into
//! the next snapshot. Reasoning engines ([`impact_llm::StructuredCompletionEngine`])
//! and the price source ([`PriceSeriesProvider`]) are injected, so nothing in
//! this crate talks to a vendor directly.
//!
//! # Example
//!
//! ```rust,ignore
//! use impact_llm::{OpenAIProvider, ProviderEngine};
//! use impact_pipeline::{NewsItem, Orchestrator, PipelineConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = Arc::new(OpenAIProvider::from_env()?);
//!     let recommender = Arc::new(ProviderEngine::new(provider.clone(), "gpt-4o"));
//!     let critic = Arc::new(ProviderEngine::new(provider, "gpt-4o-mini"));
//!
//!     let orchestrator = Orchestrator::builder()
//!         .recommender_engine(recommender)
//!         .critic_engine(critic)
//!         .price_provider(Arc::new(my_price_source()))
//!         .config(PipelineConfig::from_env()?)
//!         .build()?;
//!
//!     let state = orchestrator
//!         .run(vec![NewsItem::new("Base rate cut", "Yonhap", "...")])
//!         .await?;
//!     println!("{} primary equities", state.primary().len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod market;
pub mod model;
pub mod orchestrator;
pub mod prompts;
pub mod report;
pub mod retry;
pub mod screener;
pub mod stages;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::{EngineProfile, PipelineConfig, PipelineConfigBuilder};
pub use error::{PipelineError, PriceError, Result, Stage};
pub use market::{CachedPriceProvider, PriceBar, PriceSeriesProvider};
pub use model::{
    CandidateEquity, CritiqueResult, EquityCode, ExpectedTrend, ImpactLevel, IssueCategory,
    MarketSummary, NewsItem, RippleEffect, SentimentLabel, TechnicalStatus, TrendDirection,
};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, Phase};
pub use report::{
    AnalysisOutcome, PersistError, ReportAssembler, ReportDraft, ReportEntry, ReportGroup,
};
pub use retry::{GateState, Lane, LaneOutcome, RetryGate};
pub use screener::{IndicatorSnapshot, ScreeningOutcome, TechnicalScreener};
pub use state::{PipelineState, RunMetrics, StateDelta};

// Re-export Language from impact-prompt
pub use impact_prompt::Language;
