use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest digest accepted from the summarizer, in characters
pub const MAX_DIGEST_CHARS: usize = 500;

/// Number of keywords a summary carries
pub const KEYWORD_COUNT: usize = 5;

/// Overall tone of the news batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    #[serde(alias = "매우긍정", alias = "매우 긍정")]
    VeryPositive,
    #[serde(alias = "긍정")]
    Positive,
    #[serde(alias = "중립")]
    Neutral,
    #[serde(alias = "부정")]
    Negative,
    #[serde(alias = "매우부정", alias = "매우 부정")]
    VeryNegative,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::VeryPositive => "very positive",
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
            Self::VeryNegative => "very negative",
        };
        f.write_str(label)
    }
}

/// Kind of issue driving the news
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    #[serde(alias = "정책")]
    Policy,
    #[serde(alias = "실적")]
    Earnings,
    #[serde(alias = "기술")]
    Technology,
    #[serde(alias = "금리")]
    InterestRate,
    #[serde(alias = "지정학")]
    Geopolitics,
    #[serde(alias = "기타")]
    Other,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Policy => "policy",
            Self::Earnings => "earnings",
            Self::Technology => "technology",
            Self::InterestRate => "interest rate",
            Self::Geopolitics => "geopolitics",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// Structured digest of a news batch
///
/// Built once per run through [`MarketSummary::try_new`], which enforces the
/// bounds below, and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    digest: String,
    sentiment_score: f64,
    sentiment_label: SentimentLabel,
    keywords: Vec<String>,
    issue_category: IssueCategory,
}

impl MarketSummary {
    /// Validate and build a summary
    ///
    /// Extra keywords beyond [`KEYWORD_COUNT`] are dropped; too few is an error.
    pub fn try_new(
        digest: impl Into<String>,
        sentiment_score: f64,
        sentiment_label: SentimentLabel,
        keywords: Vec<String>,
        issue_category: IssueCategory,
    ) -> Result<Self, String> {
        let digest = digest.into();
        let digest_chars = digest.chars().count();
        if digest.trim().is_empty() {
            return Err("digest is empty".to_string());
        }
        if digest_chars > MAX_DIGEST_CHARS {
            return Err(format!(
                "digest has {digest_chars} characters, limit is {MAX_DIGEST_CHARS}"
            ));
        }

        if !sentiment_score.is_finite() || !(-1.0..=1.0).contains(&sentiment_score) {
            return Err(format!(
                "sentiment_score {sentiment_score} is outside [-1, 1]"
            ));
        }

        let mut keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.len() < KEYWORD_COUNT {
            return Err(format!(
                "expected {KEYWORD_COUNT} keywords, got {}",
                keywords.len()
            ));
        }
        keywords.truncate(KEYWORD_COUNT);

        Ok(Self {
            digest,
            sentiment_score,
            sentiment_label,
            keywords,
            issue_category,
        })
    }

    /// Short prose digest
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Sentiment in [-1, 1]
    pub fn sentiment_score(&self) -> f64 {
        self.sentiment_score
    }

    /// Sentiment bucket
    pub fn sentiment_label(&self) -> SentimentLabel {
        self.sentiment_label
    }

    /// Exactly [`KEYWORD_COUNT`] keywords, most important first
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Issue category
    pub fn issue_category(&self) -> IssueCategory {
        self.issue_category
    }
}
