//! Prompt template registry

use crate::{Language, PromptError, PromptTemplate, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe collection of named templates with a default language
///
/// Registering a name twice replaces the earlier template.
///
/// ```
/// use impact_prompt::{JinjaTemplate, Language, PromptRegistry};
/// use serde_json::json;
///
/// let registry = PromptRegistry::with_language(Language::Korean);
/// registry.register(
///     JinjaTemplate::bilingual("count", "{{ n }} stocks", "종목 {{ n }}개").unwrap(),
/// );
///
/// assert_eq!(registry.render("count", &json!({ "n": 3 })).unwrap(), "종목 3개");
/// ```
pub struct PromptRegistry {
    templates: RwLock<HashMap<String, Arc<dyn PromptTemplate>>>,
    default_language: Language,
}

impl PromptRegistry {
    /// Create an empty registry rendering English by default
    pub fn new() -> Self {
        Self::with_language(Language::English)
    }

    /// Create an empty registry with a specific default language
    pub fn with_language(lang: Language) -> Self {
        Self {
            templates: RwLock::new(HashMap::new()),
            default_language: lang,
        }
    }

    /// Language used by [`PromptRegistry::render`]
    pub fn default_language(&self) -> &Language {
        &self.default_language
    }

    /// Register a template under its own name
    pub fn register<T: PromptTemplate + 'static>(&self, template: T) {
        if let Ok(mut templates) = self.templates.write() {
            templates.insert(template.name().to_string(), Arc::new(template));
        }
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn PromptTemplate>> {
        self.templates.read().ok()?.get(name).cloned()
    }

    /// Check if a template is registered
    pub fn contains(&self, name: &str) -> bool {
        self.templates
            .read()
            .map(|t| t.contains_key(name))
            .unwrap_or(false)
    }

    /// Render a template in the default language
    pub fn render(&self, name: &str, vars: &serde_json::Value) -> Result<String> {
        self.render_with_lang(name, &self.default_language, vars)
    }

    /// Render a template in a specific language, with fallback
    pub fn render_with_lang(
        &self,
        name: &str,
        lang: &Language,
        vars: &serde_json::Value,
    ) -> Result<String> {
        let template = self
            .get(name)
            .ok_or_else(|| PromptError::TemplateNotRegistered(name.to_string()))?;

        template.render_with_fallback(lang, vars)
    }

    /// Names of all registered templates, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .templates
            .read()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Number of registered templates
    pub fn len(&self) -> usize {
        self.templates.read().map(|t| t.len()).unwrap_or(0)
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PromptRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptRegistry")
            .field("default_language", &self.default_language)
            .field("templates", &self.list())
            .finish()
    }
}
