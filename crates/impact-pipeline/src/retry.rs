//! Validate-with-retry gate shared by both lanes
//!
//! ```text
//! Recommend ──▶ Critique ──accepted──────────────▶ Accepted
//!    ▲             │
//!    └──rejected───┤
//!                  └──rejected, budget spent─────▶ Exhausted (forced pass)
//! ```
//!
//! Every critique increments the lane's retry counter whatever the verdict.
//! A lane therefore performs at most `max(max_retry, 1)` critiques and always
//! terminates.

use crate::error::{Result, Stage};
use crate::model::CritiqueResult;
use crate::stages::Proposal;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use tracing::{debug, info, instrument, warn};

/// Which recommend/critique pair a gate drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    /// First-order beneficiaries
    Primary,
    /// Ripple effects
    Secondary,
}

impl Lane {
    pub fn recommend_stage(self) -> Stage {
        match self {
            Self::Primary => Stage::PrimaryRecommend,
            Self::Secondary => Stage::SecondaryRecommend,
        }
    }

    pub fn critique_stage(self) -> Stage {
        match self {
            Self::Primary => Stage::PrimaryCritique,
            Self::Secondary => Stage::SecondaryCritique,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        })
    }
}

/// Gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Recommend,
    Critique,
    Accepted,
    Exhausted,
}

/// What to do after a critique
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Accept,
    ForcePass,
    Retry,
}

/// Decide the transition out of `Critique`
///
/// `retry_count` already includes the critique being decided.
pub fn decide(accepted: bool, retry_count: u32, max_retry: u32) -> GateDecision {
    if accepted {
        GateDecision::Accept
    } else if retry_count >= max_retry {
        GateDecision::ForcePass
    } else {
        GateDecision::Retry
    }
}

/// Result of driving one lane to a terminal state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneOutcome<T> {
    /// The last proposal made
    pub proposal: Vec<T>,
    /// Critiques performed
    pub retry_count: u32,
    /// Whether the critic accepted the last proposal
    pub accepted: bool,
    /// `Accepted` or `Exhausted`
    pub final_state: GateState,
    /// Rejection feedback, oldest first
    pub feedback: Vec<String>,
    pub warnings: Vec<String>,
    /// Recommender plus critic calls
    pub reasoning_calls: u32,
    #[serde(skip)]
    pub last_critique: Option<CritiqueResult>,
}

/// Bounded recommend/critique loop for one lane
#[derive(Debug, Clone, Copy)]
pub struct RetryGate {
    lane: Lane,
    max_retry: u32,
    confidence_floor: f64,
}

impl RetryGate {
    pub fn new(lane: Lane, max_retry: u32, confidence_floor: f64) -> Self {
        Self {
            lane,
            max_retry,
            confidence_floor,
        }
    }

    /// Drive the lane until it is accepted or its budget is spent
    ///
    /// `recommend` receives the feedback history and the attempt number;
    /// `critique` receives the proposal and the attempt number. Errors from
    /// either abort the lane immediately.
    #[instrument(skip_all, fields(lane = %self.lane, max_retry = self.max_retry))]
    pub async fn run<T, R, RFut, C, CFut>(
        &self,
        mut recommend: R,
        mut critique: C,
    ) -> Result<LaneOutcome<T>>
    where
        T: Clone,
        R: FnMut(Vec<String>, u32) -> RFut,
        RFut: Future<Output = Result<Proposal<T>>>,
        C: FnMut(Vec<T>, u32) -> CFut,
        CFut: Future<Output = Result<CritiqueResult>>,
    {
        let mut state = GateState::Recommend;
        let mut attempt = 0;
        let mut retry_count = 0;
        let mut reasoning_calls = 0;
        let mut proposal = Vec::new();
        let mut feedback = Vec::new();
        let mut warnings = Vec::new();
        let mut last_critique = None;

        loop {
            debug!(?state, attempt, retry_count, "gate step");
            match state {
                GateState::Recommend => {
                    attempt += 1;
                    let proposed = recommend(feedback.clone(), attempt).await?;
                    reasoning_calls += 1;
                    warnings.extend(proposed.warnings);
                    proposal = proposed.items;
                    state = GateState::Critique;
                }
                GateState::Critique => {
                    let verdict = critique(proposal.clone(), attempt).await?;
                    reasoning_calls += 1;
                    retry_count += 1;

                    if verdict.confidence < self.confidence_floor {
                        let message = format!(
                            "{} critic confidence {:.2} is below {:.2} on attempt {attempt}",
                            self.lane, verdict.confidence, self.confidence_floor
                        );
                        warn!("{message}");
                        warnings.push(message);
                    }

                    state = match decide(verdict.accepted, retry_count, self.max_retry) {
                        GateDecision::Accept => GateState::Accepted,
                        GateDecision::ForcePass => {
                            let message = format!(
                                "{} validation forced through after {retry_count} rejected attempt(s): {}",
                                self.lane,
                                rejection_note(&verdict)
                            );
                            warn!("{message}");
                            warnings.push(message);
                            GateState::Exhausted
                        }
                        GateDecision::Retry => {
                            feedback.push(rejection_note(&verdict));
                            GateState::Recommend
                        }
                    };
                    last_critique = Some(verdict);
                }
                GateState::Accepted | GateState::Exhausted => break,
            }
        }

        let accepted = state == GateState::Accepted;
        info!(
            retry_count,
            accepted,
            proposed = proposal.len(),
            "{} lane finished",
            self.lane
        );

        Ok(LaneOutcome {
            proposal,
            retry_count,
            accepted,
            final_state: state,
            feedback,
            warnings,
            reasoning_calls,
            last_critique,
        })
    }
}

/// Critic feedback with its listed issues folded in
fn rejection_note(verdict: &CritiqueResult) -> String {
    let issues: Vec<&str> = verdict.issues.iter().map(String::as_str).collect();
    match (verdict.feedback.is_empty(), issues.is_empty()) {
        (true, true) => "rejected without feedback".to_string(),
        (false, true) => verdict.feedback.clone(),
        (true, false) => issues.join("; "),
        (false, false) => format!("{} (issues: {})", verdict.feedback, issues.join("; ")),
    }
}
