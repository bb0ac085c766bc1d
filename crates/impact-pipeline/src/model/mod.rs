//! Domain model shared by every stage

mod critique;
mod equity;
mod news;
mod ripple;
mod summary;

pub use critique::CritiqueResult;
pub use equity::{CandidateEquity, EquityCode, ExpectedTrend, InvalidEquityCode, TechnicalStatus};
pub use news::NewsItem;
pub use ripple::{ImpactLevel, RippleEffect, TrendDirection};
pub use summary::{IssueCategory, KEYWORD_COUNT, MAX_DIGEST_CHARS, MarketSummary, SentimentLabel};

pub(crate) use news::truncate_chars;
