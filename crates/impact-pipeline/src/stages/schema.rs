//! Output schemas for each reasoning call and decoding into the domain model
//!
//! Required fields missing from an answer, wrong types and out-of-range values
//! are schema violations. Only the fields documented as optional carry
//! defaults. Malformed equity codes are dropped with a warning instead.

use crate::model::{
    CandidateEquity, CritiqueResult, EquityCode, ExpectedTrend, ImpactLevel, IssueCategory,
    MarketSummary, RippleEffect, SentimentLabel, TrendDirection,
};
use impact_llm::{LLMError, OutputSchema};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashSet;

pub const MARKET_SUMMARY: &str = "market_summary";
pub const PRIMARY_CANDIDATES: &str = "primary_candidates";
pub const RIPPLE_EFFECTS: &str = "ripple_effects";
pub const PRIMARY_CRITIQUE: &str = "primary_critique";
pub const SECONDARY_CRITIQUE: &str = "secondary_critique";

const DEFAULT_CONFIDENCE: f64 = 50.0;
const DEFAULT_CRITIC_CONFIDENCE: f64 = 0.5;

fn equity_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "identifier": { "type": "string", "pattern": "^[0-9]{6}$" },
            "name": { "type": "string" },
            "rationale": { "type": "string" },
            "confidence": { "type": "number", "minimum": 0, "maximum": 100 },
            "expected_trend": { "type": "string", "enum": ["up", "down", "neutral"] }
        },
        "required": ["identifier", "name", "rationale"]
    })
}

/// Schema for the summarizer answer
pub fn market_summary() -> OutputSchema {
    OutputSchema::new(
        MARKET_SUMMARY,
        json!({
            "type": "object",
            "properties": {
                "digest": { "type": "string", "maxLength": crate::model::MAX_DIGEST_CHARS },
                "sentiment_score": { "type": "number", "minimum": -1, "maximum": 1 },
                "sentiment_label": {
                    "type": "string",
                    "enum": ["very_positive", "positive", "neutral", "negative", "very_negative"]
                },
                "keywords": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": crate::model::KEYWORD_COUNT,
                    "maxItems": crate::model::KEYWORD_COUNT
                },
                "issue_category": {
                    "type": "string",
                    "enum": ["policy", "earnings", "technology", "interest_rate", "geopolitics", "other"]
                }
            },
            "required": ["digest", "sentiment_score", "sentiment_label", "keywords", "issue_category"],
            "additionalProperties": false
        }),
    )
}

/// Schema for the first-order recommender answer
pub fn primary_candidates(count: usize) -> OutputSchema {
    OutputSchema::new(
        PRIMARY_CANDIDATES,
        json!({
            "type": "object",
            "properties": {
                "equities": { "type": "array", "items": equity_schema(), "maxItems": count }
            },
            "required": ["equities"]
        }),
    )
}

/// Schema for the ripple-effect recommender answer
pub fn ripple_effects(count: usize) -> OutputSchema {
    OutputSchema::new(
        RIPPLE_EFFECTS,
        json!({
            "type": "object",
            "properties": {
                "effects": {
                    "type": "array",
                    "maxItems": count,
                    "items": {
                        "type": "object",
                        "properties": {
                            "sector": { "type": "string" },
                            "causal_chain": { "type": "string" },
                            "impact_level": { "type": "string", "enum": ["high", "medium", "low"] },
                            "trend_direction": {
                                "type": "string",
                                "enum": ["positive", "negative", "neutral"]
                            },
                            "related_equities": { "type": "array", "items": equity_schema() }
                        },
                        "required": ["sector", "causal_chain"]
                    }
                }
            },
            "required": ["effects"]
        }),
    )
}

/// Schema for a critic verdict; `name` distinguishes the two lanes
pub fn critique(name: &str) -> OutputSchema {
    OutputSchema::new(
        name,
        json!({
            "type": "object",
            "properties": {
                "accepted": { "type": "boolean" },
                "feedback": { "type": "string" },
                "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
                "issues": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["accepted", "feedback"]
        }),
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSummary {
    digest: String,
    sentiment_score: f64,
    sentiment_label: SentimentLabel,
    keywords: Vec<String>,
    issue_category: IssueCategory,
}

impl RawSummary {
    pub(crate) fn into_summary(self) -> Result<MarketSummary, LLMError> {
        MarketSummary::try_new(
            self.digest,
            self.sentiment_score,
            self.sentiment_label,
            self.keywords,
            self.issue_category,
        )
        .map_err(|detail| LLMError::schema_violation(MARKET_SUMMARY, detail))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawEquity {
    identifier: String,
    name: String,
    rationale: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    expected_trend: Option<ExpectedTrend>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCandidates {
    equities: Vec<RawEquity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRipple {
    sector: String,
    causal_chain: String,
    #[serde(default)]
    impact_level: ImpactLevel,
    #[serde(default)]
    trend_direction: TrendDirection,
    #[serde(default)]
    related_equities: Vec<RawEquity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRipples {
    effects: Vec<RawRipple>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCritique {
    accepted: bool,
    feedback: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    issues: Vec<String>,
}

impl RawCritique {
    pub(crate) fn into_result(self, schema: &str) -> Result<CritiqueResult, LLMError> {
        let confidence = self.confidence.unwrap_or(DEFAULT_CRITIC_CONFIDENCE);
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(LLMError::schema_violation(
                schema,
                format!("critic confidence {confidence} is outside [0, 1]"),
            ));
        }

        Ok(CritiqueResult {
            accepted: self.accepted,
            feedback: self.feedback.trim().to_string(),
            confidence,
            issues: self
                .issues
                .into_iter()
                .map(|issue| issue.trim().to_string())
                .filter(|issue| !issue.is_empty())
                .collect(),
        })
    }
}

/// Equity list after identifier filtering
#[derive(Debug)]
pub(crate) struct Filtered<T> {
    pub items: Vec<T>,
    pub warnings: Vec<String>,
}

impl<T> Default for Filtered<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Validate recommender equities
///
/// Drops malformed, duplicate and excluded identifiers with a warning, then
/// keeps the first `limit`.
pub(crate) fn convert_equities(
    schema: &str,
    raw: Vec<RawEquity>,
    excluded: &HashSet<EquityCode>,
    limit: usize,
) -> Result<Filtered<CandidateEquity>, LLMError> {
    let mut out = Filtered::default();
    let mut seen = HashSet::new();

    for entry in raw {
        let identifier = match EquityCode::parse(&entry.identifier) {
            Ok(code) => code,
            Err(e) => {
                out.warnings
                    .push(format!("dropped {}: {e}", entry.name.trim()));
                continue;
            }
        };
        if excluded.contains(&identifier) {
            out.warnings.push(format!(
                "dropped {} ({identifier}): excluded by technical screening",
                entry.name.trim()
            ));
            continue;
        }
        if !seen.insert(identifier.clone()) {
            out.warnings
                .push(format!("dropped duplicate equity {identifier}"));
            continue;
        }

        let equity = CandidateEquity::try_new(
            identifier,
            entry.name.trim(),
            entry.rationale.trim(),
            entry.confidence.unwrap_or(DEFAULT_CONFIDENCE),
            entry.expected_trend.unwrap_or_default(),
        )
        .map_err(|detail| LLMError::schema_violation(schema, detail))?;
        out.items.push(equity);
    }

    if out.items.len() > limit {
        out.items.truncate(limit);
    }
    Ok(out)
}

impl RawCandidates {
    pub(crate) fn into_candidates(
        self,
        limit: usize,
    ) -> Result<Filtered<CandidateEquity>, LLMError> {
        convert_equities(PRIMARY_CANDIDATES, self.equities, &HashSet::new(), limit)
    }
}

impl RawRipples {
    /// Convert ripple effects, dropping related equities that are `excluded`
    pub(crate) fn into_effects(
        self,
        limit: usize,
        excluded: &HashSet<EquityCode>,
    ) -> Result<Filtered<RippleEffect>, LLMError> {
        let mut out = Filtered::default();

        for raw in self.effects.into_iter().take(limit) {
            let related = convert_equities(RIPPLE_EFFECTS, raw.related_equities, excluded, usize::MAX)?;
            out.warnings.extend(
                related
                    .warnings
                    .into_iter()
                    .map(|w| format!("{}: {w}", raw.sector.trim())),
            );
            out.items.push(RippleEffect {
                sector: raw.sector.trim().to_string(),
                causal_chain: raw.causal_chain.trim().to_string(),
                impact_level: raw.impact_level,
                trend_direction: raw.trend_direction,
                related_equities: related.items,
            });
        }

        Ok(out)
    }
}
