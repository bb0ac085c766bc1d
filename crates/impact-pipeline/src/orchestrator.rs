//! Pipeline state machine
//!
//! ```text
//! Summarize ─▶ PrimaryValidation ─▶ TechnicalScreen ─▶ SecondaryValidation ─▶ Complete
//! ```
//!
//! Phases run strictly in order. Each produces a [`StateDelta`] merged into
//! the run's [`PipelineState`]; the first fatal error aborts the run.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result, Stage};
use crate::market::PriceSeriesProvider;
use crate::model::{CandidateEquity, MarketSummary, NewsItem, RippleEffect};
use crate::prompts::register_prompts;
use crate::report::{AnalysisOutcome, ReportAssembler, ReportDraft};
use crate::retry::{Lane, LaneOutcome, RetryGate};
use crate::screener::TechnicalScreener;
use crate::stages::{CandidateRecommender, Critic, SentimentSummarizer};
use crate::state::{PipelineState, StateDelta};
use chrono::{NaiveDate, Utc};
use impact_llm::StructuredCompletionEngine;
use impact_prompt::PromptRegistry;
use std::fmt;
use std::sync::Arc;
use tracing::{Span, field, info, instrument, warn};

/// Orchestrator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Summarize,
    PrimaryValidation,
    TechnicalScreen,
    SecondaryValidation,
    Complete,
}

impl Phase {
    /// The phase that follows this one
    pub fn next(self) -> Self {
        match self {
            Self::Summarize => Self::PrimaryValidation,
            Self::PrimaryValidation => Self::TechnicalScreen,
            Self::TechnicalScreen => Self::SecondaryValidation,
            Self::SecondaryValidation | Self::Complete => Self::Complete,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Summarize => "summarize",
            Self::PrimaryValidation => "primary-validation",
            Self::TechnicalScreen => "technical-screen",
            Self::SecondaryValidation => "secondary-validation",
            Self::Complete => "complete",
        })
    }
}

/// Runs the news-to-report pipeline
///
/// Holds no per-run state, so one orchestrator can serve concurrent runs as
/// long as its engines and price provider can.
///
/// # Example
///
/// ```rust,ignore
/// let orchestrator = Orchestrator::builder()
///     .recommender_engine(recommender)
///     .critic_engine(critic)
///     .price_provider(prices)
///     .config(PipelineConfig::default())
///     .build()?;
///
/// let state = orchestrator.run(news).await?;
/// ```
pub struct Orchestrator {
    config: PipelineConfig,
    summarizer: SentimentSummarizer,
    recommender: CandidateRecommender,
    critic: Critic,
    screener: TechnicalScreener,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every phase over `news`
    #[instrument(skip(self, news), fields(items = news.len(), run_id = field::Empty))]
    pub async fn run(&self, news: Vec<NewsItem>) -> Result<PipelineState> {
        if news.is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let mut state = PipelineState::new(news);
        let mut phase = Phase::Summarize;
        Span::current().record("run_id", field::display(state.run_id()));
        info!("run started");

        while phase != Phase::Complete {
            info!(%phase, "entering phase");
            let delta = match phase {
                Phase::Summarize => {
                    StateDelta::Summarized(self.summarizer.summarize(state.news()).await?)
                }
                Phase::PrimaryValidation => StateDelta::PrimaryValidated(self.validate_primary(&state).await?),
                Phase::TechnicalScreen => {
                    StateDelta::Screened(self.screener.screen(state.primary().to_vec()).await)
                }
                Phase::SecondaryValidation => {
                    StateDelta::SecondaryValidated(self.validate_secondary(&state).await?)
                }
                Phase::Complete => break,
            };
            state = state.apply(delta);
            phase = phase.next();
        }

        let state = state.apply(StateDelta::Finished(Utc::now()));
        let metrics = state.metrics();
        info!(
            run_id = %state.run_id(),
            reasoning_calls = metrics.reasoning_calls,
            primary_attempts = metrics.primary_attempts,
            secondary_attempts = metrics.secondary_attempts,
            screened = metrics.screened_equities,
            elapsed_ms = metrics.elapsed().map(|d| d.num_milliseconds()),
            warnings = state.warnings().len(),
            "run complete"
        );
        Ok(state)
    }

    /// Run the pipeline, then hand the report to `assembler` exactly once
    ///
    /// A storage failure is returned as [`PipelineError::Persistence`], which
    /// still carries the finished state.
    pub async fn analyze_and_persist(
        &self,
        news: Vec<NewsItem>,
        analysis_date: NaiveDate,
        assembler: &dyn ReportAssembler,
    ) -> Result<AnalysisOutcome> {
        let state = self.run(news).await?;
        self.persist(state, analysis_date, assembler).await
    }

    /// Hand a finished run's report to `assembler` exactly once
    ///
    /// Lets callers bound [`Orchestrator::run`] by a deadline without a slow
    /// write being mistaken for a slow run.
    pub async fn persist(
        &self,
        state: PipelineState,
        analysis_date: NaiveDate,
        assembler: &dyn ReportAssembler,
    ) -> Result<AnalysisOutcome> {
        let persisted = match ReportDraft::from_state(&state, analysis_date) {
            Ok(draft) => assembler.persist(&draft).await,
            Err(e) => Err(e),
        };

        match persisted {
            Ok(report_id) => {
                info!(run_id = %state.run_id(), %report_id, "report persisted");
                Ok(AnalysisOutcome { report_id, state })
            }
            Err(source) => {
                warn!(run_id = %state.run_id(), error = %source, "report persistence failed");
                Err(PipelineError::Persistence {
                    state: Box::new(state),
                    source,
                })
            }
        }
    }

    async fn validate_primary(&self, state: &PipelineState) -> Result<LaneOutcome<CandidateEquity>> {
        let summary = summary_for(state, Stage::PrimaryRecommend)?;
        let count = self.config.primary_count;

        RetryGate::new(
            Lane::Primary,
            self.config.max_retry,
            self.config.primary_confidence_floor,
        )
        .run(
            |feedback, attempt| async move {
                self.recommender
                    .propose_primary(summary, count, &feedback, attempt)
                    .await
            },
            |candidates, attempt| async move {
                self.critic.review_primary(summary, &candidates, attempt).await
            },
        )
        .await
    }

    async fn validate_secondary(&self, state: &PipelineState) -> Result<LaneOutcome<RippleEffect>> {
        let summary = summary_for(state, Stage::SecondaryRecommend)?;
        let primary = state.primary();
        let excluded = state.technically_rejected();
        let count = self.config.secondary_count;

        RetryGate::new(
            Lane::Secondary,
            self.config.max_retry,
            self.config.secondary_confidence_floor,
        )
        .run(
            |feedback, attempt| async move {
                self.recommender
                    .propose_ripple(summary, primary, excluded, count, &feedback, attempt)
                    .await
            },
            |effects, attempt| async move {
                self.critic
                    .review_ripple(summary, primary, &effects, attempt)
                    .await
            },
        )
        .await
    }
}

fn summary_for(state: &PipelineState, stage: Stage) -> Result<&MarketSummary> {
    state.summary().ok_or(PipelineError::OutOfOrder(stage))
}

/// Builder for [`Orchestrator`]
#[derive(Default)]
pub struct OrchestratorBuilder {
    summarizer_engine: Option<Arc<dyn StructuredCompletionEngine>>,
    recommender_engine: Option<Arc<dyn StructuredCompletionEngine>>,
    critic_engine: Option<Arc<dyn StructuredCompletionEngine>>,
    price_provider: Option<Arc<dyn PriceSeriesProvider>>,
    prompts: Option<Arc<PromptRegistry>>,
    config: PipelineConfig,
}

impl OrchestratorBuilder {
    /// Engine for the summarizer; defaults to the recommender engine
    pub fn summarizer_engine(mut self, engine: Arc<dyn StructuredCompletionEngine>) -> Self {
        self.summarizer_engine = Some(engine);
        self
    }

    /// Engine for both recommender lanes
    pub fn recommender_engine(mut self, engine: Arc<dyn StructuredCompletionEngine>) -> Self {
        self.recommender_engine = Some(engine);
        self
    }

    /// Engine for both critic lanes
    pub fn critic_engine(mut self, engine: Arc<dyn StructuredCompletionEngine>) -> Self {
        self.critic_engine = Some(engine);
        self
    }

    pub fn price_provider(mut self, provider: Arc<dyn PriceSeriesProvider>) -> Self {
        self.price_provider = Some(provider);
        self
    }

    /// Prompt registry; defaults to the built-in set in the configured language
    pub fn prompts(mut self, prompts: Arc<PromptRegistry>) -> Self {
        self.prompts = Some(prompts);
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Orchestrator> {
        self.config.validate()?;

        let recommender_engine = self
            .recommender_engine
            .ok_or_else(|| PipelineError::Config("a recommender engine is required".to_string()))?;
        let critic_engine = self
            .critic_engine
            .ok_or_else(|| PipelineError::Config("a critic engine is required".to_string()))?;
        let price_provider = self
            .price_provider
            .ok_or_else(|| PipelineError::Config("a price provider is required".to_string()))?;
        let summarizer_engine = self
            .summarizer_engine
            .unwrap_or_else(|| Arc::clone(&recommender_engine));

        let prompts = match self.prompts {
            Some(prompts) => prompts,
            None => {
                let registry = PromptRegistry::with_language(self.config.language.clone());
                register_prompts(&registry)
                    .map_err(|e| PipelineError::Config(format!("prompt set is invalid: {e}")))?;
                Arc::new(registry)
            }
        };

        Ok(Orchestrator {
            summarizer: SentimentSummarizer::new(summarizer_engine, Arc::clone(&prompts), &self.config),
            recommender: CandidateRecommender::new(recommender_engine, Arc::clone(&prompts), &self.config),
            critic: Critic::new(critic_engine, prompts, &self.config),
            screener: TechnicalScreener::new(
                price_provider,
                self.config.price_lookback_days,
                self.config.min_price_bars,
            ),
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PriceError;
    use crate::market::MockPriceSeriesProvider;
    use crate::model::{EquityCode, TechnicalStatus};
    use crate::report::{MockReportAssembler, PersistError};
    use crate::screener::fixtures::{calm, rally, single_signal};
    use crate::stages::schema;
    use crate::testing::{
        ScriptedEngine, candidates_json, critique_json, ripples_json, summary_json,
    };
    use impact_llm::{FailureKind, LLMError};
    use mockall::predicate::eq;

    const BANKS: [(&str, &str); 3] = [
        ("105560", "KB Financial"),
        ("055550", "Shinhan Financial"),
        ("086790", "Hana Financial"),
    ];

    fn rate_cut_news() -> Vec<NewsItem> {
        [
            "Bank of Korea cuts base rate by 25bp",
            "First rate cut in three years",
            "Bond yields fall after rate decision",
            "Mortgage rates expected to ease",
            "Banks weigh margin outlook after cut",
        ]
        .iter()
        .map(|title| NewsItem::new(*title, "Yonhap", format!("{title}. Details follow.")))
        .collect()
    }

    struct Harness {
        recommender: Arc<ScriptedEngine>,
        critic: Arc<ScriptedEngine>,
    }

    impl Harness {
        fn new() -> Self {
            let recommender = Arc::new(ScriptedEngine::new());
            let critic = Arc::new(ScriptedEngine::new());
            recommender.push(schema::MARKET_SUMMARY, summary_json());
            Self {
                recommender,
                critic,
            }
        }

        fn primary(&self, equities: &[(&str, &str)], accepted: bool, feedback: &str) -> &Self {
            self.recommender
                .push(schema::PRIMARY_CANDIDATES, candidates_json(equities));
            self.critic
                .push(schema::PRIMARY_CRITIQUE, critique_json(accepted, feedback, 0.9));
            self
        }

        fn secondary_accepted(&self) -> &Self {
            self.recommender.push(
                schema::RIPPLE_EFFECTS,
                ripples_json(&[("Construction", &[("000720", "Hyundai E&C")])]),
            );
            self.critic
                .push(schema::SECONDARY_CRITIQUE, critique_json(true, "", 0.85));
            self
        }

        fn orchestrator(&self, max_retry: u32, prices: MockPriceSeriesProvider) -> Orchestrator {
            let config = PipelineConfig::builder().max_retry(max_retry).build().unwrap();
            Orchestrator::builder()
                .recommender_engine(self.recommender.clone())
                .critic_engine(self.critic.clone())
                .price_provider(Arc::new(prices))
                .config(config)
                .build()
                .unwrap()
        }
    }

    fn calm_prices_once_each(codes: &[&str]) -> MockPriceSeriesProvider {
        let mut prices = MockPriceSeriesProvider::new();
        for code in codes {
            prices
                .expect_daily_bars()
                .with(eq(EquityCode::parse(code).unwrap()), eq(100))
                .times(1)
                .returning(|_, _| Ok(calm()));
        }
        prices
    }

    #[tokio::test]
    async fn test_scenario_accepted_first_attempt() {
        let harness = Harness::new();
        harness.primary(&BANKS, true, "").secondary_accepted();
        let prices = calm_prices_once_each(&["105560", "055550", "086790"]);

        let state = harness.orchestrator(2, prices).run(rate_cut_news()).await.unwrap();

        assert_eq!(state.primary_retry_count(), 1);
        assert!(state.is_primary_valid());
        assert!(state.warnings().iter().all(|w| !w.contains("forced")));
        assert!(state.is_screened());
        assert_eq!(state.primary().len(), 3);
        assert!(state.primary().iter().all(|e| e.technical_status() == TechnicalStatus::Healthy));
        assert_eq!(state.ripple_effects().len(), 1);
        assert_eq!(state.secondary_retry_count(), 1);
        assert_eq!(state.metrics().reasoning_calls, 5);
        assert_eq!(state.metrics().screened_equities, 3);
        assert!(state.metrics().elapsed().is_some());

        let summarize = harness.recommender.requests_for(schema::MARKET_SUMMARY);
        assert!(summarize[0].prompt.contains("these 5 articles"));
    }

    #[tokio::test]
    async fn test_scenario_accepted_on_final_attempt() {
        let harness = Harness::new();
        harness
            .primary(&[("000720", "Hyundai E&C")], false, "Builders are second-order.")
            .primary(&[("999999", "Unknown Co")], false, "999999 is not a listed code.")
            .primary(&BANKS, true, "")
            .secondary_accepted();
        let prices = calm_prices_once_each(&["105560", "055550", "086790"]);

        let state = harness.orchestrator(3, prices).run(rate_cut_news()).await.unwrap();

        assert_eq!(state.primary_retry_count(), 3);
        assert!(state.is_primary_valid());
        assert!(state.warnings().iter().all(|w| !w.contains("forced")));
        assert_eq!(state.primary_feedback().len(), 2);

        let proposals = harness.recommender.requests_for(schema::PRIMARY_CANDIDATES);
        assert_eq!(proposals.len(), 3);
        assert!(!proposals[0].prompt.contains("MANDATORY"));
        assert!(proposals[1].prompt.contains("Builders are second-order."));
        assert!(proposals[2].prompt.contains("999999 is not a listed code."));
        assert!(proposals[2].prompt.contains("- Builders are second-order."));
    }

    #[tokio::test]
    async fn test_scenario_exhausted_forces_pass() {
        let harness = Harness::new();
        harness
            .primary(&[("105560", "KB Financial")], false, "too vague")
            .primary(&[("105560", "KB Financial")], false, "still vague")
            .primary(&[("055550", "Shinhan Financial")], false, "rationale exaggerated")
            .secondary_accepted();
        let prices = calm_prices_once_each(&["055550"]);

        let state = harness.orchestrator(3, prices).run(rate_cut_news()).await.unwrap();

        assert_eq!(state.primary_retry_count(), 3);
        assert!(!state.is_primary_valid());
        let forced: Vec<&String> = state
            .warnings()
            .iter()
            .filter(|w| w.starts_with("primary validation forced through"))
            .collect();
        assert_eq!(forced.len(), 1);
        assert!(forced[0].contains("rationale exaggerated"));
        assert_eq!(state.primary().len(), 1);
        assert_eq!(state.primary()[0].identifier.as_str(), "055550");
        assert_eq!(state.primary()[0].technical_status(), TechnicalStatus::Healthy);
    }

    #[tokio::test]
    async fn test_scenario_single_signal_is_caution() {
        let harness = Harness::new();
        harness.primary(&BANKS, true, "").secondary_accepted();

        let mut prices = MockPriceSeriesProvider::new();
        prices
            .expect_daily_bars()
            .with(eq(EquityCode::parse("055550").unwrap()), eq(100))
            .times(1)
            .returning(|_, _| Ok(single_signal()));
        prices
            .expect_daily_bars()
            .times(2)
            .returning(|_, _| Ok(calm()));

        let state = harness.orchestrator(3, prices).run(rate_cut_news()).await.unwrap();

        assert_eq!(state.primary().len(), 3);
        assert!(state.technically_rejected().is_empty());
        let shinhan = &state.primary()[1];
        assert_eq!(shinhan.technical_status(), TechnicalStatus::Caution);
        assert!(shinhan.technical_note().unwrap().contains("RSI 75.0"));
        let snap = shinhan.indicators().unwrap();
        assert!((snap.disparity - 95.0).abs() < 1e-6);
        assert_eq!(state.primary()[0].technical_status(), TechnicalStatus::Healthy);
        assert_eq!(state.primary()[2].technical_status(), TechnicalStatus::Healthy);
    }

    #[tokio::test]
    async fn test_overheated_equity_excluded_downstream() {
        let harness = Harness::new();
        harness.primary(&BANKS, true, "");
        harness.recommender.push(
            schema::RIPPLE_EFFECTS,
            ripples_json(&[(
                "Insurance",
                &[("055550", "Shinhan Financial"), ("032830", "Samsung Life")],
            )]),
        );
        harness
            .critic
            .push(schema::SECONDARY_CRITIQUE, critique_json(true, "", 0.5));

        let mut prices = MockPriceSeriesProvider::new();
        prices
            .expect_daily_bars()
            .with(eq(EquityCode::parse("055550").unwrap()), eq(100))
            .returning(|_, _| Ok(rally()));
        prices.expect_daily_bars().returning(|_, _| Ok(calm()));

        let state = harness.orchestrator(3, prices).run(rate_cut_news()).await.unwrap();

        assert_eq!(state.primary().len(), 2);
        assert_eq!(state.technically_rejected().len(), 1);
        let related = &state.ripple_effects()[0].related_equities;
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].identifier.as_str(), "032830");

        let ripple_prompt = &harness.recommender.requests_for(schema::RIPPLE_EFFECTS)[0].prompt;
        assert!(ripple_prompt.contains("never name these"));
        assert!(state.warnings().iter().any(|w| w.contains("excluded by technical screening")));
        assert!(state.warnings().iter().any(|w| w.starts_with("secondary critic confidence 0.50 is below 0.60")));
    }

    #[tokio::test]
    async fn test_unavailable_prices_degrade() {
        let harness = Harness::new();
        harness.primary(&BANKS[..1], true, "").secondary_accepted();

        let mut prices = MockPriceSeriesProvider::new();
        prices
            .expect_daily_bars()
            .returning(|_, _| Err(PriceError::Transport("session expired".to_string())));

        let state = harness.orchestrator(3, prices).run(rate_cut_news()).await.unwrap();
        assert_eq!(state.primary()[0].technical_status(), TechnicalStatus::DataUnavailable);
        assert_eq!(state.ripple_effects().len(), 1);
    }

    #[tokio::test]
    async fn test_critic_failure_aborts_run() {
        let harness = Harness::new();
        harness
            .recommender
            .push(schema::PRIMARY_CANDIDATES, candidates_json(&BANKS));
        harness
            .critic
            .push_error(schema::PRIMARY_CRITIQUE, LLMError::Refusal("policy".to_string()));

        let err = harness
            .orchestrator(3, MockPriceSeriesProvider::new())
            .run(rate_cut_news())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Engine { stage: Stage::PrimaryCritique, attempt: 1, .. }
        ));
        assert_eq!(err.failure_kind(), Some(FailureKind::Refusal));
        assert!(harness.recommender.requests_for(schema::RIPPLE_EFFECTS).is_empty());
    }

    #[tokio::test]
    async fn test_empty_news_rejected_before_any_call() {
        let harness = Harness::new();
        let err = harness
            .orchestrator(3, MockPriceSeriesProvider::new())
            .run(vec![])
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::EmptyInput));
        assert!(harness.recommender.requests().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_and_persist_calls_assembler_once() {
        let harness = Harness::new();
        harness.primary(&BANKS, true, "").secondary_accepted();
        let prices = calm_prices_once_each(&["105560", "055550", "086790"]);

        let mut assembler = MockReportAssembler::new();
        assembler
            .expect_persist()
            .withf(|draft| draft.groups.len() == 2 && draft.groups[0].equities.len() == 3)
            .times(1)
            .returning(|_| Ok("report-1".to_string()));

        let date = NaiveDate::from_ymd_opt(2024, 10, 11).unwrap();
        let outcome = harness
            .orchestrator(2, prices)
            .analyze_and_persist(rate_cut_news(), date, &assembler)
            .await
            .unwrap();

        assert_eq!(outcome.report_id, "report-1");
        assert!(outcome.state.is_primary_valid());
    }

    #[tokio::test]
    async fn test_persistence_failure_is_distinct() {
        let harness = Harness::new();
        harness.primary(&BANKS, true, "").secondary_accepted();
        let prices = calm_prices_once_each(&["105560", "055550", "086790"]);

        let mut assembler = MockReportAssembler::new();
        assembler
            .expect_persist()
            .times(1)
            .returning(|_| Err(PersistError::Storage("disk full".to_string())));

        let date = NaiveDate::from_ymd_opt(2024, 10, 11).unwrap();
        let err = harness
            .orchestrator(2, prices)
            .analyze_and_persist(rate_cut_news(), date, &assembler)
            .await
            .unwrap_err();

        assert!(err.is_persistence());
        assert_eq!(err.failure_kind(), None);
        let PipelineError::Persistence { state, .. } = err else {
            panic!("expected a persistence error");
        };
        assert_eq!(state.primary().len(), 3);
    }

    #[tokio::test]
    async fn test_persist_finished_state_separately() {
        let harness = Harness::new();
        harness.primary(&BANKS, true, "").secondary_accepted();
        let prices = calm_prices_once_each(&["105560", "055550", "086790"]);
        let orchestrator = harness.orchestrator(2, prices);
        let state = orchestrator.run(rate_cut_news()).await.unwrap();
        let run_id = state.run_id();

        let mut failing = MockReportAssembler::new();
        failing
            .expect_persist()
            .times(1)
            .returning(|_| Err(PersistError::Storage("timed out".to_string())));

        let date = NaiveDate::from_ymd_opt(2024, 10, 11).unwrap();
        let err = orchestrator.persist(state, date, &failing).await.unwrap_err();
        let PipelineError::Persistence { state, .. } = err else {
            panic!("expected a persistence error");
        };
        assert_eq!(state.run_id(), run_id);

        let mut working = MockReportAssembler::new();
        working
            .expect_persist()
            .times(1)
            .returning(|_| Ok("report-2".to_string()));
        let outcome = orchestrator.persist(*state, date, &working).await.unwrap();
        assert_eq!(outcome.report_id, "report-2");
        assert_eq!(outcome.state.run_id(), run_id);
    }

    #[tokio::test]
    async fn test_concurrent_runs_share_nothing() {
        let harness = Harness::new();
        harness.recommender.push(schema::MARKET_SUMMARY, summary_json());
        harness.primary(&BANKS, true, "").primary(&BANKS, true, "");
        harness.secondary_accepted().secondary_accepted();

        let mut prices = MockPriceSeriesProvider::new();
        prices.expect_daily_bars().times(6).returning(|_, _| Ok(calm()));
        let orchestrator = harness.orchestrator(2, prices);

        let (first, second) = futures::join!(
            orchestrator.run(rate_cut_news()),
            orchestrator.run(rate_cut_news())
        );
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_ne!(first.run_id(), second.run_id());
        assert_eq!(first.primary_retry_count(), 1);
        assert_eq!(second.primary_retry_count(), 1);
    }

    #[test]
    fn test_builder_requires_engines() {
        let err = Orchestrator::builder().build().err().unwrap();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_phase_order() {
        let mut phase = Phase::Summarize;
        let mut seen = vec![phase];
        while phase != Phase::Complete {
            phase = phase.next();
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![
                Phase::Summarize,
                Phase::PrimaryValidation,
                Phase::TechnicalScreen,
                Phase::SecondaryValidation,
                Phase::Complete,
            ]
        );
    }
}
