//! Core prompt template trait

use crate::{Language, PromptError, Result};

/// A named prompt with one variant per language
///
/// Variables are passed as `serde_json::Value` so the trait stays dyn-compatible.
///
/// # Examples
///
/// ```
/// use impact_prompt::{JinjaTemplate, Language, PromptTemplate};
/// use serde_json::json;
///
/// let template = JinjaTemplate::bilingual(
///     "headline",
///     "Issue: {{ issue }}",
///     "이슈: {{ issue }}",
/// )
/// .unwrap();
///
/// let rendered = template.render(&Language::Korean, &json!({ "issue": "금리 인하" })).unwrap();
/// assert_eq!(rendered, "이슈: 금리 인하");
/// ```
pub trait PromptTemplate: Send + Sync {
    /// Template identifier
    fn name(&self) -> &str;

    /// Languages this template has a variant for
    fn languages(&self) -> Vec<Language>;

    /// Check if a language is supported
    fn supports_language(&self, lang: &Language) -> bool {
        self.languages().contains(lang)
    }

    /// Render the variant for `lang`
    fn render(&self, lang: &Language, vars: &serde_json::Value) -> Result<String>;

    /// Render `lang`, falling back to English and then to any available variant
    fn render_with_fallback(&self, lang: &Language, vars: &serde_json::Value) -> Result<String> {
        if self.supports_language(lang) {
            return self.render(lang, vars);
        }

        if self.supports_language(&Language::English) {
            return self.render(&Language::English, vars);
        }

        let fallback = self
            .languages()
            .into_iter()
            .next()
            .ok_or_else(|| PromptError::NoLanguageAvailable(self.name().to_string()))?;

        self.render(&fallback, vars)
    }

    /// Raw template source for a language
    fn raw_template(&self, lang: &Language) -> Option<&str>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    struct StaticTemplate {
        name: String,
        variants: HashMap<Language, String>,
    }

    impl StaticTemplate {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                variants: HashMap::new(),
            }
        }

        fn with(mut self, lang: Language, content: &str) -> Self {
            self.variants.insert(lang, content.to_string());
            self
        }
    }

    impl PromptTemplate for StaticTemplate {
        fn name(&self) -> &str {
            &self.name
        }

        fn languages(&self) -> Vec<Language> {
            self.variants.keys().cloned().collect()
        }

        fn render(&self, lang: &Language, _vars: &serde_json::Value) -> Result<String> {
            self.variants
                .get(lang)
                .cloned()
                .ok_or_else(|| PromptError::TemplateNotFound {
                    name: self.name.clone(),
                    language: lang.code().to_string(),
                })
        }

        fn raw_template(&self, lang: &Language) -> Option<&str> {
            self.variants.get(lang).map(String::as_str)
        }
    }

    #[test]
    fn test_fallback_prefers_english() {
        let template = StaticTemplate::new("critic")
            .with(Language::English, "Review")
            .with(Language::Korean, "검토");

        let rendered = template
            .render_with_fallback(&Language::Other("ja".to_string()), &json!({}))
            .unwrap();
        assert_eq!(rendered, "Review");
    }

    #[test]
    fn test_fallback_to_first_available() {
        let template = StaticTemplate::new("critic").with(Language::Korean, "검토");

        let rendered = template
            .render_with_fallback(&Language::English, &json!({}))
            .unwrap();
        assert_eq!(rendered, "검토");
    }

    #[test]
    fn test_fallback_without_variants() {
        let template = StaticTemplate::new("empty");
        let err = template
            .render_with_fallback(&Language::English, &json!({}))
            .unwrap_err();
        assert!(matches!(err, PromptError::NoLanguageAvailable(_)));
    }
}
