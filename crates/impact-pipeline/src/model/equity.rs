use crate::screener::IndicatorSnapshot;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static EQUITY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6}$").expect("equity code pattern is valid"));

/// Raised when a string is not a six-digit exchange code
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{0}' is not a six-digit equity code")]
pub struct InvalidEquityCode(pub String);

/// Six-digit numeric exchange code, e.g. `005930`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EquityCode(String);

impl EquityCode {
    /// Parse a code, trimming surrounding whitespace
    pub fn parse(raw: &str) -> Result<Self, InvalidEquityCode> {
        let trimmed = raw.trim();
        if EQUITY_CODE.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(InvalidEquityCode(raw.to_string()))
        }
    }

    /// The code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EquityCode {
    type Error = InvalidEquityCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EquityCode> for String {
    fn from(code: EquityCode) -> Self {
        code.0
    }
}

impl fmt::Display for EquityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Expected price direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedTrend {
    #[default]
    Up,
    Down,
    Neutral,
}

impl fmt::Display for ExpectedTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Neutral => "neutral",
        })
    }
}

/// Outcome of technical screening
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnicalStatus {
    /// Not screened yet
    #[default]
    Unknown,
    /// No overheat signal
    Healthy,
    /// One overheat signal
    Caution,
    /// Two or more overheat signals; excluded
    Overheated,
    /// Too little or no price history
    DataUnavailable,
    /// Indicators could not be computed
    ComputeError,
}

impl TechnicalStatus {
    /// Whether an equity with this status stays in the candidate list
    pub fn is_retained(self) -> bool {
        !matches!(self, Self::Overheated)
    }
}

impl fmt::Display for TechnicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Healthy => "healthy",
            Self::Caution => "caution",
            Self::Overheated => "overheated",
            Self::DataUnavailable => "data_unavailable",
            Self::ComputeError => "compute_error",
        })
    }
}

/// An equity proposed as affected by the news
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateEquity {
    /// Exchange code
    pub identifier: EquityCode,
    /// Company name
    pub display_name: String,
    /// Why the equity is affected
    pub rationale: String,
    /// Recommender confidence in [0, 100]
    pub confidence: f64,
    /// Expected direction
    pub expected_trend: ExpectedTrend,
    technical_status: TechnicalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    technical_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    indicators: Option<IndicatorSnapshot>,
}

impl CandidateEquity {
    /// Build an unscreened candidate; confidence must lie in [0, 100]
    pub fn try_new(
        identifier: EquityCode,
        display_name: impl Into<String>,
        rationale: impl Into<String>,
        confidence: f64,
        expected_trend: ExpectedTrend,
    ) -> Result<Self, String> {
        if !confidence.is_finite() || !(0.0..=100.0).contains(&confidence) {
            return Err(format!(
                "confidence {confidence} for {identifier} is outside [0, 100]"
            ));
        }

        Ok(Self {
            identifier,
            display_name: display_name.into(),
            rationale: rationale.into(),
            confidence,
            expected_trend,
            technical_status: TechnicalStatus::Unknown,
            technical_note: None,
            indicators: None,
        })
    }

    /// Confidence scaled to [0, 1]
    pub fn normalized_confidence(&self) -> f64 {
        self.confidence / 100.0
    }

    /// Screening verdict
    pub fn technical_status(&self) -> TechnicalStatus {
        self.technical_status
    }

    /// Screening note
    pub fn technical_note(&self) -> Option<&str> {
        self.technical_note.as_deref()
    }

    /// Indicator values behind the verdict, when they could be computed
    pub fn indicators(&self) -> Option<&IndicatorSnapshot> {
        self.indicators.as_ref()
    }

    /// Record the screening verdict
    ///
    /// Returns `false`, leaving the equity untouched, if it was already screened.
    pub(crate) fn record_screening(
        &mut self,
        status: TechnicalStatus,
        note: Option<String>,
        indicators: Option<IndicatorSnapshot>,
    ) -> bool {
        if self.technical_status != TechnicalStatus::Unknown {
            return false;
        }
        self.technical_status = status;
        self.technical_note = note;
        self.indicators = indicators;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equity_code_validation() {
        assert!(EquityCode::parse("005930").is_ok());
        assert_eq!(EquityCode::parse(" 000660 ").unwrap().as_str(), "000660");
        assert!(EquityCode::parse("05930").is_err());
        assert!(EquityCode::parse("0059301").is_err());
        assert!(EquityCode::parse("AAPL").is_err());
        assert!(EquityCode::parse("12345６").is_err());
    }

    #[test]
    fn test_equity_code_serde() {
        let code: EquityCode = serde_json::from_str("\"035420\"").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"035420\"");
        assert!(serde_json::from_str::<EquityCode>("\"NAVER\"").is_err());
    }

    #[test]
    fn test_confidence_bounds() {
        let code = EquityCode::parse("005930").unwrap();
        assert!(CandidateEquity::try_new(code.clone(), "A", "r", 100.0, ExpectedTrend::Up).is_ok());
        assert!(CandidateEquity::try_new(code.clone(), "A", "r", 100.5, ExpectedTrend::Up).is_err());
        assert!(CandidateEquity::try_new(code, "A", "r", f64::NAN, ExpectedTrend::Up).is_err());
    }

    #[test]
    fn test_screening_recorded_once() {
        let mut equity = CandidateEquity::try_new(
            EquityCode::parse("005930").unwrap(),
            "Samsung Electronics",
            "memory demand",
            80.0,
            ExpectedTrend::Up,
        )
        .unwrap();

        assert!(equity.record_screening(TechnicalStatus::Healthy, Some("normal range".into()), None));
        assert!(!equity.record_screening(TechnicalStatus::Overheated, None, None));
        assert_eq!(equity.technical_status(), TechnicalStatus::Healthy);
        assert_eq!(equity.technical_note(), Some("normal range"));
        assert!((equity.normalized_confidence() - 0.8).abs() < 1e-12);
    }
}
