//! MiniJinja-backed templates
//!
//! Templates render with strict undefined handling: a prompt that references a
//! variable the caller did not supply fails instead of silently rendering an
//! empty string.

use crate::{Language, PromptError, PromptTemplate, Result};
use minijinja::{Environment, UndefinedBehavior};
use std::collections::HashMap;

/// A multi-language prompt template rendered by MiniJinja
///
/// # Examples
///
/// ```
/// use impact_prompt::{JinjaTemplate, Language, PromptTemplate};
/// use serde_json::json;
///
/// let template = JinjaTemplate::builder("feedback")
///     .english("{% if feedback %}Fix: {{ feedback }}{% endif %}")
///     .korean("{% if feedback %}수정: {{ feedback }}{% endif %}")
///     .build()
///     .unwrap();
///
/// let rendered = template
///     .render(&Language::English, &json!({ "feedback": "too indirect" }))
///     .unwrap();
/// assert_eq!(rendered, "Fix: too indirect");
/// ```
pub struct JinjaTemplate {
    name: String,
    templates: HashMap<Language, String>,
}

impl JinjaTemplate {
    /// Create a new template builder
    pub fn builder(name: impl Into<String>) -> JinjaTemplateBuilder {
        JinjaTemplateBuilder::new(name)
    }

    /// Create from a single English template
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Result<Self> {
        Self::builder(name).english(template).build()
    }

    /// Create with English and Korean variants
    pub fn bilingual(
        name: impl Into<String>,
        english: impl Into<String>,
        korean: impl Into<String>,
    ) -> Result<Self> {
        Self::builder(name).english(english).korean(korean).build()
    }

    fn environment<'source>() -> Environment<'source> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_filter("signed", |value: f64| format!("{value:+.2}"));
        env
    }
}

impl PromptTemplate for JinjaTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn languages(&self) -> Vec<Language> {
        self.templates.keys().cloned().collect()
    }

    fn render(&self, lang: &Language, vars: &serde_json::Value) -> Result<String> {
        let source = self
            .templates
            .get(lang)
            .ok_or_else(|| PromptError::TemplateNotFound {
                name: self.name.clone(),
                language: lang.code().to_string(),
            })?;

        let env = Self::environment();
        let context = minijinja::Value::from_serialize(vars);

        env.render_str(source, context)
            .map_err(|e| PromptError::RenderError {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }

    fn raw_template(&self, lang: &Language) -> Option<&str> {
        self.templates.get(lang).map(String::as_str)
    }
}

impl std::fmt::Debug for JinjaTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JinjaTemplate")
            .field("name", &self.name)
            .field("languages", &self.templates.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`JinjaTemplate`]
pub struct JinjaTemplateBuilder {
    name: String,
    templates: HashMap<Language, String>,
}

impl JinjaTemplateBuilder {
    /// Create a new builder with the given template name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            templates: HashMap::new(),
        }
    }

    /// Add a variant for a specific language
    pub fn template(mut self, lang: Language, content: impl Into<String>) -> Self {
        self.templates.insert(lang, content.into());
        self
    }

    /// Add the English variant
    pub fn english(self, content: impl Into<String>) -> Self {
        self.template(Language::English, content)
    }

    /// Add the Korean variant
    pub fn korean(self, content: impl Into<String>) -> Self {
        self.template(Language::Korean, content)
    }

    /// Build the template, checking that every variant parses
    ///
    /// Only syntax is checked here; variables are resolved at render time.
    pub fn build(self) -> Result<JinjaTemplate> {
        if self.templates.is_empty() {
            return Err(PromptError::NoTemplatesProvided(self.name));
        }

        {
            let env = JinjaTemplate::environment();
            for (lang, content) in &self.templates {
                env.template_from_str(content)
                    .map_err(|e| PromptError::TemplateParseFailed {
                        name: self.name.clone(),
                        language: lang.code().to_string(),
                        detail: e.to_string(),
                    })?;
            }
        }

        Ok(JinjaTemplate {
            name: self.name,
            templates: self.templates,
        })
    }
}
