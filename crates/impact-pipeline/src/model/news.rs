use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One news article fed into a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Headline
    pub title: String,
    /// Publisher
    #[serde(default)]
    pub source: String,
    /// Article text
    #[serde(alias = "content")]
    pub body: String,
    /// Publication time, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl NewsItem {
    /// Create an item without a publication time
    pub fn new(title: impl Into<String>, source: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            body: body.into(),
            published_at: None,
        }
    }
}

/// Keep at most `max_chars` characters, never splitting a code point
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
