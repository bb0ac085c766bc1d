//! Prompt languages

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language a prompt variant is written in
///
/// # Examples
///
/// ```
/// use impact_prompt::Language;
///
/// assert_eq!(Language::from_code("ko"), Language::Korean);
/// assert_eq!(Language::from_code("한국어"), Language::Korean);
/// assert_eq!(Language::Korean.code(), "ko");
/// assert_eq!(Language::from_code("ja"), Language::Other("ja".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    /// English
    #[default]
    English,
    /// Korean
    Korean,
    /// Other languages (ISO 639-1 code)
    Other(String),
}

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &str {
        match self {
            Language::English => "en",
            Language::Korean => "ko",
            Language::Other(code) => code,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        match self {
            Language::English => "English",
            Language::Korean => "Korean",
            Language::Other(code) => code,
        }
    }

    /// Parse from an ISO 639-1 code or a common name, case-insensitively
    pub fn from_code(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" | "en-us" => Language::English,
            "ko" | "korean" | "kr" | "ko-kr" | "한국어" => Language::Korean,
            other => Language::Other(other.to_string()),
        }
    }

    /// Whether this is one of the built-in languages
    pub fn is_known(&self) -> bool {
        !matches!(self, Language::Other(_))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<&str> for Language {
    fn from(s: &str) -> Self {
        Language::from_code(s)
    }
}

impl From<String> for Language {
    fn from(s: String) -> Self {
        Language::from_code(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Language::from_code("EN"), Language::English);
        assert_eq!(Language::from_code(" korean "), Language::Korean);
        assert_eq!(Language::from_code("ko-KR"), Language::Korean);
        assert_eq!(
            Language::from_code("ja"),
            Language::Other("ja".to_string())
        );
    }

    #[test]
    fn test_is_known() {
        assert!(Language::Korean.is_known());
        assert!(!Language::Other("ja".to_string()).is_known());
    }

    #[test]
    fn test_display_and_default() {
        assert_eq!(Language::Korean.to_string(), "Korean");
        assert_eq!(Language::default(), Language::English);
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Language::Korean).unwrap();
        let parsed: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Language::Korean);
    }
}
