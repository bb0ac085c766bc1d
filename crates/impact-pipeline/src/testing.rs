//! Test doubles shared by the crate's unit tests

use crate::model::{IssueCategory, MarketSummary, SentimentLabel};
use crate::prompts::register_prompts;
use async_trait::async_trait;
use impact_llm::{LLMError, StructuredCompletionEngine, StructuredRequest};
use impact_prompt::{Language, PromptRegistry};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Engine that replays queued answers per schema name and records requests
#[derive(Default)]
pub(crate) struct ScriptedEngine {
    queues: Mutex<HashMap<String, VecDeque<Result<Value, LLMError>>>>,
    requests: Mutex<Vec<StructuredRequest>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, schema: &str, answer: Value) {
        self.queue(schema, Ok(answer));
    }

    pub fn push_error(&self, schema: &str, error: LLMError) {
        self.queue(schema, Err(error));
    }

    fn queue(&self, schema: &str, answer: Result<Value, LLMError>) {
        self.queues
            .lock()
            .unwrap()
            .entry(schema.to_string())
            .or_default()
            .push_back(answer);
    }

    pub fn requests(&self) -> Vec<StructuredRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests made for one schema, in order
    pub fn requests_for(&self, schema: &str) -> Vec<StructuredRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.schema.name == schema)
            .collect()
    }
}

#[async_trait]
impl StructuredCompletionEngine for ScriptedEngine {
    async fn complete(&self, request: StructuredRequest) -> impact_llm::Result<Value> {
        let name = request.schema.name.clone();
        self.requests.lock().unwrap().push(request);
        self.queues
            .lock()
            .unwrap()
            .get_mut(&name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(LLMError::RequestFailed(format!("no scripted answer for {name}"))))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub(crate) fn registry() -> Arc<PromptRegistry> {
    let registry = PromptRegistry::with_language(Language::English);
    register_prompts(&registry).unwrap();
    Arc::new(registry)
}

pub(crate) fn summary_json() -> Value {
    json!({
        "digest": "The central bank cut the base rate by 25bp, its first cut in three years.",
        "sentiment_score": 0.6,
        "sentiment_label": "positive",
        "keywords": ["base rate", "rate cut", "banks", "housing", "bonds"],
        "issue_category": "interest_rate"
    })
}

pub(crate) fn sample_summary() -> MarketSummary {
    MarketSummary::try_new(
        "The central bank cut the base rate by 25bp, its first cut in three years.",
        0.6,
        SentimentLabel::Positive,
        ["base rate", "rate cut", "banks", "housing", "bonds"]
            .map(String::from)
            .to_vec(),
        IssueCategory::InterestRate,
    )
    .unwrap()
}

pub(crate) fn candidates_json(equities: &[(&str, &str)]) -> Value {
    let equities: Vec<Value> = equities
        .iter()
        .map(|(identifier, name)| {
            json!({
                "identifier": identifier,
                "name": name,
                "rationale": format!("{name} benefits directly from lower funding costs"),
                "confidence": 80,
                "expected_trend": "up"
            })
        })
        .collect();
    json!({ "equities": equities })
}

pub(crate) fn ripples_json(effects: &[(&str, &[(&str, &str)])]) -> Value {
    let effects: Vec<Value> = effects
        .iter()
        .map(|(sector, related)| {
            let related: Vec<Value> = related
                .iter()
                .map(|(identifier, name)| {
                    json!({ "identifier": identifier, "name": name, "rationale": "second-order demand" })
                })
                .collect();
            json!({
                "sector": sector,
                "causal_chain": format!("rate cut -> cheaper credit -> {sector} demand"),
                "impact_level": "medium",
                "trend_direction": "positive",
                "related_equities": related
            })
        })
        .collect();
    json!({ "effects": effects })
}

pub(crate) fn critique_json(accepted: bool, feedback: &str, confidence: f64) -> Value {
    json!({
        "accepted": accepted,
        "feedback": feedback,
        "confidence": confidence,
        "issues": []
    })
}
