//! News batch to market summary

use super::StageCall;
use super::schema::{self, RawSummary};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result, Stage};
use crate::model::{MarketSummary, NewsItem, truncate_chars};
use crate::prompts;
use impact_llm::StructuredCompletionEngine;
use impact_prompt::PromptRegistry;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

/// Produces the run's [`MarketSummary`]
///
/// The entry point of every run. Failures here are fatal and never retried.
pub struct SentimentSummarizer {
    call: StageCall,
    news_limit: usize,
    body_chars: usize,
}

impl SentimentSummarizer {
    pub fn new(
        engine: Arc<dyn StructuredCompletionEngine>,
        prompts: Arc<PromptRegistry>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            call: StageCall::new(engine, prompts, config.summarizer),
            news_limit: config.news_limit,
            body_chars: config.news_body_chars,
        }
    }

    /// Summarize the first `news_limit` items, bodies cut to `news_body_chars`
    #[instrument(skip(self, news), fields(items = news.len()))]
    pub async fn summarize(&self, news: &[NewsItem]) -> Result<MarketSummary> {
        if news.is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let articles: Vec<_> = news
            .iter()
            .take(self.news_limit)
            .map(|item| {
                json!({
                    "title": item.title,
                    "source": item.source,
                    "body": truncate_chars(&item.body, self.body_chars),
                })
            })
            .collect();

        let raw: RawSummary = self
            .call
            .invoke(
                Stage::Summarize,
                1,
                prompts::SUMMARIZER,
                prompts::SUMMARIZE,
                &json!({ "articles": articles }),
                schema::market_summary(),
            )
            .await?;

        let summary = raw
            .into_summary()
            .map_err(|e| PipelineError::engine(Stage::Summarize, 1, e))?;

        info!(
            sentiment = summary.sentiment_score(),
            category = %summary.issue_category(),
            "news summarized"
        );
        Ok(summary)
    }
}
