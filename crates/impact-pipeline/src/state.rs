//! Run state and the deltas that advance it
//!
//! The orchestrator is the only writer. Stages see `&PipelineState` and return
//! values that become a [`StateDelta`]; [`PipelineState::apply`] consumes the
//! old snapshot and yields the next one.

use crate::model::{CandidateEquity, MarketSummary, NewsItem, RippleEffect};
use crate::retry::LaneOutcome;
use crate::screener::ScreeningOutcome;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Counters and timings for one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetrics {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Summarizer, recommender and critic calls
    pub reasoning_calls: u32,
    /// Critiques performed in the primary lane
    pub primary_attempts: u32,
    /// Critiques performed in the secondary lane
    pub secondary_attempts: u32,
    /// Equities the technical screener assessed
    pub screened_equities: usize,
}

impl RunMetrics {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            finished_at: None,
            reasoning_calls: 0,
            primary_attempts: 0,
            secondary_attempts: 0,
            screened_equities: 0,
        }
    }

    /// Wall time of a finished run
    pub fn elapsed(&self) -> Option<TimeDelta> {
        self.finished_at.map(|end| end - self.started_at)
    }
}

/// Everything a run knows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineState {
    pub(crate) run_id: Uuid,
    pub(crate) news: Vec<NewsItem>,
    pub(crate) summary: Option<MarketSummary>,
    pub(crate) primary: Vec<CandidateEquity>,
    pub(crate) primary_retry_count: u32,
    pub(crate) is_primary_valid: bool,
    pub(crate) primary_feedback: Vec<String>,
    pub(crate) screened: bool,
    pub(crate) technically_rejected: Vec<CandidateEquity>,
    pub(crate) ripple_effects: Vec<RippleEffect>,
    pub(crate) secondary_retry_count: u32,
    pub(crate) is_secondary_valid: bool,
    pub(crate) secondary_feedback: Vec<String>,
    pub(crate) warnings: Vec<String>,
    pub(crate) metrics: RunMetrics,
}

/// One stage's contribution to the state
#[derive(Debug, Clone)]
pub enum StateDelta {
    /// Summary produced; starts the run's metrics and clears warnings
    Summarized(MarketSummary),
    /// Primary lane reached a terminal state
    PrimaryValidated(LaneOutcome<CandidateEquity>),
    /// Technical screening finished
    Screened(ScreeningOutcome),
    /// Secondary lane reached a terminal state
    SecondaryValidated(LaneOutcome<RippleEffect>),
    /// Run completed
    Finished(DateTime<Utc>),
}

impl PipelineState {
    /// Fresh state for a news batch
    pub fn new(news: Vec<NewsItem>) -> Self {
        let run_id = Uuid::new_v4();
        Self {
            run_id,
            news,
            summary: None,
            primary: Vec::new(),
            primary_retry_count: 0,
            is_primary_valid: false,
            primary_feedback: Vec::new(),
            screened: false,
            technically_rejected: Vec::new(),
            ripple_effects: Vec::new(),
            secondary_retry_count: 0,
            is_secondary_valid: false,
            secondary_feedback: Vec::new(),
            warnings: Vec::new(),
            metrics: RunMetrics::new(run_id),
        }
    }

    /// Merge a delta into the state
    ///
    /// Warnings only ever grow, except that a new summary starts a new run.
    #[must_use]
    pub fn apply(mut self, delta: StateDelta) -> Self {
        match delta {
            StateDelta::Summarized(summary) => {
                self.summary = Some(summary);
                self.warnings.clear();
                self.metrics = RunMetrics::new(self.run_id);
                self.metrics.reasoning_calls = 1;
            }
            StateDelta::PrimaryValidated(outcome) => {
                self.primary = outcome.proposal;
                self.primary_retry_count = outcome.retry_count;
                self.is_primary_valid = outcome.accepted;
                self.primary_feedback = outcome.feedback;
                self.warnings.extend(outcome.warnings);
                self.metrics.reasoning_calls += outcome.reasoning_calls;
                self.metrics.primary_attempts = outcome.retry_count;
            }
            StateDelta::Screened(outcome) => {
                self.metrics.screened_equities = outcome.kept.len() + outcome.rejected.len();
                self.primary = outcome.kept;
                self.technically_rejected = outcome.rejected;
                self.warnings.extend(outcome.warnings);
                self.screened = true;
            }
            StateDelta::SecondaryValidated(outcome) => {
                self.ripple_effects = outcome.proposal;
                self.secondary_retry_count = outcome.retry_count;
                self.is_secondary_valid = outcome.accepted;
                self.secondary_feedback = outcome.feedback;
                self.warnings.extend(outcome.warnings);
                self.metrics.reasoning_calls += outcome.reasoning_calls;
                self.metrics.secondary_attempts = outcome.retry_count;
            }
            StateDelta::Finished(at) => {
                self.metrics.finished_at = Some(at);
            }
        }
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn news(&self) -> &[NewsItem] {
        &self.news
    }

    pub fn summary(&self) -> Option<&MarketSummary> {
        self.summary.as_ref()
    }

    /// First-order equities; after screening, only the retained ones
    pub fn primary(&self) -> &[CandidateEquity] {
        &self.primary
    }

    pub fn primary_retry_count(&self) -> u32 {
        self.primary_retry_count
    }

    pub fn is_primary_valid(&self) -> bool {
        self.is_primary_valid
    }

    pub fn primary_feedback(&self) -> &[String] {
        &self.primary_feedback
    }

    pub fn is_screened(&self) -> bool {
        self.screened
    }

    /// Equities excluded as overheated
    pub fn technically_rejected(&self) -> &[CandidateEquity] {
        &self.technically_rejected
    }

    pub fn ripple_effects(&self) -> &[RippleEffect] {
        &self.ripple_effects
    }

    pub fn secondary_retry_count(&self) -> u32 {
        self.secondary_retry_count
    }

    pub fn is_secondary_valid(&self) -> bool {
        self.is_secondary_valid
    }

    pub fn secondary_feedback(&self) -> &[String] {
        &self.secondary_feedback
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }
}
