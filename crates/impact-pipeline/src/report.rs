//! Report draft and the persistence boundary

use crate::model::{
    CandidateEquity, EquityCode, ExpectedTrend, ImpactLevel, IssueCategory, SentimentLabel,
    TechnicalStatus, TrendDirection,
};
use crate::state::{PipelineState, RunMetrics};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Failures while storing a finished report
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("run has no summary; nothing to report")]
    Incomplete,

    #[error("report storage failed: {0}")]
    Storage(String),

    #[error("report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Stores a report and returns its id
///
/// Called once per run, after the pipeline reaches a terminal state. A write
/// is all-or-nothing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportAssembler: Send + Sync {
    async fn persist(&self, draft: &ReportDraft) -> Result<String, PersistError>;
}

/// One equity line in a report group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub identifier: EquityCode,
    pub name: String,
    pub expected_trend: ExpectedTrend,
    /// Recommender confidence scaled to [0, 1]
    pub confidence: f64,
    pub rationale: String,
    pub technical_status: TechnicalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_note: Option<String>,
}

impl From<&CandidateEquity> for ReportEntry {
    fn from(equity: &CandidateEquity) -> Self {
        Self {
            identifier: equity.identifier.clone(),
            name: equity.display_name.clone(),
            expected_trend: equity.expected_trend,
            confidence: equity.normalized_confidence(),
            rationale: equity.rationale.clone(),
            technical_status: equity.technical_status(),
            technical_note: equity.technical_note().map(str::to_string),
        }
    }
}

/// A titled set of equities sharing one impact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportGroup {
    pub title: String,
    pub impact_level: ImpactLevel,
    pub trend_direction: TrendDirection,
    pub description: String,
    pub equities: Vec<ReportEntry>,
}

/// Report content assembled from a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDraft {
    pub run_id: Uuid,
    pub analysis_date: NaiveDate,
    pub title: String,
    pub digest: String,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub keywords: Vec<String>,
    pub issue_category: IssueCategory,
    /// Titles of the articles analysed
    pub sources: Vec<String>,
    /// "Direct beneficiaries" first, then one group per ripple effect
    pub groups: Vec<ReportGroup>,
    pub primary_validated: bool,
    pub secondary_validated: bool,
    pub warnings: Vec<String>,
    pub metrics: RunMetrics,
}

pub const DIRECT_BENEFICIARIES: &str = "Direct beneficiaries";

impl ReportDraft {
    /// Build the draft for `analysis_date`
    ///
    /// Technically rejected equities are left out.
    pub fn from_state(state: &PipelineState, analysis_date: NaiveDate) -> Result<Self, PersistError> {
        let summary = state.summary().ok_or(PersistError::Incomplete)?;

        let direct = ReportGroup {
            title: DIRECT_BENEFICIARIES.to_string(),
            impact_level: ImpactLevel::High,
            trend_direction: if summary.sentiment_score() > 0.0 {
                TrendDirection::Positive
            } else {
                TrendDirection::Neutral
            },
            description: format!(
                "Companies directly affected by the {} issue",
                summary.issue_category()
            ),
            equities: state.primary().iter().map(ReportEntry::from).collect(),
        };

        let ripples = state.ripple_effects().iter().map(|effect| ReportGroup {
            title: effect.sector.clone(),
            impact_level: effect.impact_level,
            trend_direction: effect.trend_direction,
            description: effect.causal_chain.clone(),
            equities: effect.related_equities.iter().map(ReportEntry::from).collect(),
        });

        Ok(Self {
            run_id: state.run_id(),
            analysis_date,
            title: format!("{analysis_date} news impact analysis"),
            digest: summary.digest().to_string(),
            sentiment_score: summary.sentiment_score(),
            sentiment_label: summary.sentiment_label(),
            keywords: summary.keywords().to_vec(),
            issue_category: summary.issue_category(),
            sources: state.news().iter().map(|n| n.title.clone()).collect(),
            groups: std::iter::once(direct).chain(ripples).collect(),
            primary_validated: state.is_primary_valid(),
            secondary_validated: state.is_secondary_valid(),
            warnings: state.warnings().to_vec(),
            metrics: state.metrics().clone(),
        })
    }
}

/// A persisted run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub report_id: String,
    pub state: PipelineState,
}
