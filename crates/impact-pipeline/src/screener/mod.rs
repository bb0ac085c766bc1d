//! Technical screening of first-order candidates
//!
//! Each candidate's recent price history is scored for "priced in" signals:
//!
//! | signal    | condition                 |
//! |-----------|---------------------------|
//! | momentum  | RSI(14) >= 70             |
//! | extension | disparity vs MA20 >= 110  |
//! | band      | close >= upper Bollinger  |
//!
//! Two or more signals exclude the candidate; one keeps it with a caution
//! note. Missing or short history and computation failures keep the candidate
//! unchanged, so a single bad series never blocks a run.

mod indicators;

pub use indicators::{
    BAND_WIDTH, IndicatorError, IndicatorSnapshot, MA_PERIOD, RSI_PERIOD, moving_average, rsi,
    sample_stdev, snapshot,
};

use crate::market::{PriceBar, PriceSeriesProvider};
use crate::model::{CandidateEquity, TechnicalStatus};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_OVERSOLD: f64 = 30.0;
const RSI_MIDLINE: f64 = 50.0;
const DISPARITY_OVERHEATED: f64 = 110.0;
const DISPARITY_EARLY_TREND: f64 = 105.0;

/// Result of scoring one price series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub status: TechnicalStatus,
    /// Number of overheat signals, when indicators were computed
    pub overheat_score: Option<u8>,
    pub note: String,
    pub indicators: Option<IndicatorSnapshot>,
}

/// Score a price series
///
/// Pure: the same bars always produce the same assessment.
pub fn assess(bars: &[PriceBar], min_bars: usize) -> Assessment {
    if bars.len() < min_bars {
        return Assessment {
            status: TechnicalStatus::DataUnavailable,
            overheat_score: None,
            note: format!("only {} daily bars, need {min_bars}", bars.len()),
            indicators: None,
        };
    }

    match snapshot(bars) {
        Ok(snap) => classify(&snap),
        Err(e) => Assessment {
            status: TechnicalStatus::ComputeError,
            overheat_score: None,
            note: e.to_string(),
            indicators: None,
        },
    }
}

/// Turn indicator values into a verdict
pub fn classify(snap: &IndicatorSnapshot) -> Assessment {
    let mut signals = Vec::new();
    if snap.rsi >= RSI_OVERBOUGHT {
        signals.push(format!("RSI {:.1} >= {RSI_OVERBOUGHT}", snap.rsi));
    }
    if snap.disparity >= DISPARITY_OVERHEATED {
        signals.push(format!(
            "disparity {:.1} >= {DISPARITY_OVERHEATED}",
            snap.disparity
        ));
    }
    if snap.close >= snap.upper_band {
        signals.push(format!(
            "close {:.2} at or above upper band {:.2}",
            snap.close, snap.upper_band
        ));
    }

    let score = signals.len() as u8;
    let (status, note) = match score {
        0 => {
            let phase = if snap.rsi < RSI_OVERSOLD || snap.close < snap.lower_band {
                "bottoming"
            } else if snap.rsi < RSI_MIDLINE && snap.disparity < DISPARITY_EARLY_TREND {
                "early uptrend"
            } else {
                "normal range"
            };
            (
                TechnicalStatus::Healthy,
                format!(
                    "{phase} (RSI {:.1}, disparity {:.1})",
                    snap.rsi, snap.disparity
                ),
            )
        }
        1 => (
            TechnicalStatus::Caution,
            format!("caution: {}", signals.join("; ")),
        ),
        _ => (
            TechnicalStatus::Overheated,
            format!("overheated: {}", signals.join("; ")),
        ),
    };

    Assessment {
        status,
        overheat_score: Some(score),
        note,
        indicators: Some(*snap),
    }
}

/// Candidates split by screening verdict
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScreeningOutcome {
    /// Retained candidates, in input order
    pub kept: Vec<CandidateEquity>,
    /// Overheated candidates, in input order
    pub rejected: Vec<CandidateEquity>,
    pub warnings: Vec<String>,
}

/// Fetches price history and screens candidates one at a time
pub struct TechnicalScreener {
    provider: Arc<dyn PriceSeriesProvider>,
    lookback_days: usize,
    min_bars: usize,
}

impl TechnicalScreener {
    /// Create a screener
    pub fn new(provider: Arc<dyn PriceSeriesProvider>, lookback_days: usize, min_bars: usize) -> Self {
        Self {
            provider,
            lookback_days,
            min_bars,
        }
    }

    /// Screen every candidate exactly once
    #[instrument(skip(self, candidates), fields(count = candidates.len()))]
    pub async fn screen(&self, candidates: Vec<CandidateEquity>) -> ScreeningOutcome {
        let mut outcome = ScreeningOutcome::default();

        if candidates.is_empty() {
            outcome
                .warnings
                .push("technical screening skipped: no candidates to screen".to_string());
            return outcome;
        }

        for mut equity in candidates {
            let assessment = self.assess_equity(&equity).await;
            debug!(
                identifier = %equity.identifier,
                status = %assessment.status,
                score = ?assessment.overheat_score,
                indicators = ?assessment.indicators,
                "screened"
            );

            equity.record_screening(
                assessment.status,
                Some(assessment.note),
                assessment.indicators,
            );

            if assessment.status.is_retained() {
                outcome.kept.push(equity);
            } else {
                outcome.rejected.push(equity);
            }
        }

        if outcome.kept.is_empty() {
            outcome
                .warnings
                .push("all candidates overheated; no first-order equity retained".to_string());
        } else if !outcome.rejected.is_empty() {
            let names: Vec<String> = outcome
                .rejected
                .iter()
                .map(|e| format!("{} ({})", e.display_name, e.identifier))
                .collect();
            outcome.warnings.push(format!(
                "{} overheated candidate(s) excluded: {}",
                outcome.rejected.len(),
                names.join(", ")
            ));
        }

        for warning in &outcome.warnings {
            warn!("{warning}");
        }
        info!(
            kept = outcome.kept.len(),
            rejected = outcome.rejected.len(),
            "technical screening finished"
        );

        outcome
    }

    async fn assess_equity(&self, equity: &CandidateEquity) -> Assessment {
        match self
            .provider
            .daily_bars(&equity.identifier, self.lookback_days)
            .await
        {
            Ok(mut bars) => {
                if bars.len() > self.lookback_days {
                    bars.drain(..bars.len() - self.lookback_days);
                }
                assess(&bars, self.min_bars)
            }
            Err(e) => Assessment {
                status: TechnicalStatus::DataUnavailable,
                overheat_score: None,
                note: e.to_string(),
                indicators: None,
            },
        }
    }
}
