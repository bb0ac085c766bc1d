//! Prompt templates for the news impact pipeline
//!
//! Templates are MiniJinja sources with one variant per [`Language`], kept in
//! a thread-safe [`PromptRegistry`]. Rendering is strict: every variable a
//! template references must be supplied.
//!
//! ```
//! use impact_prompt::{JinjaTemplate, Language, PromptRegistry};
//! use serde_json::json;
//!
//! let registry = PromptRegistry::with_language(Language::English);
//! registry.register(
//!     JinjaTemplate::bilingual(
//!         "recommend",
//!         "Pick {{ count }} stocks{% if feedback %} (fix: {{ feedback }}){% endif %}",
//!         "종목 {{ count }}개 선정{% if feedback %} (수정: {{ feedback }}){% endif %}",
//!     )
//!     .unwrap(),
//! );
//!
//! let prompt = registry
//!     .render("recommend", &json!({ "count": 3, "feedback": null }))
//!     .unwrap();
//! assert_eq!(prompt, "Pick 3 stocks");
//! ```

mod error;
mod jinja;
mod language;
mod registry;
mod template;

pub use error::{PromptError, Result};
pub use jinja::{JinjaTemplate, JinjaTemplateBuilder};
pub use language::Language;
pub use registry::PromptRegistry;
pub use template::PromptTemplate;
