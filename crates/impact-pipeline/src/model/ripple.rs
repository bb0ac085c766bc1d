use super::CandidateEquity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strength of a ripple effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        })
    }
}

/// Direction a ripple effect pushes its sector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    #[default]
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        })
    }
}

/// Second-order impact on a sector
///
/// Related equities are not technically screened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RippleEffect {
    pub sector: String,
    pub causal_chain: String,
    pub impact_level: ImpactLevel,
    pub trend_direction: TrendDirection,
    pub related_equities: Vec<CandidateEquity>,
}
