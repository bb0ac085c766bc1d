//! Prompt templates for the reasoning stages
//!
//! - `system`: role prompts for the summarizer, recommenders and critics
//! - `user`: per-call messages rendered from pipeline data

mod system;
mod user;

pub use system::*;
pub use user::*;

use impact_prompt::{PromptRegistry, Result};

pub const SUMMARIZER: &str = "impact.system.summarizer";
pub const PRIMARY_RECOMMENDER: &str = "impact.system.primary_recommender";
pub const SECONDARY_RECOMMENDER: &str = "impact.system.secondary_recommender";
pub const PRIMARY_CRITIC: &str = "impact.system.primary_critic";
pub const SECONDARY_CRITIC: &str = "impact.system.secondary_critic";

pub const SUMMARIZE: &str = "impact.user.summarize";
pub const RECOMMEND_PRIMARY: &str = "impact.user.recommend_primary";
pub const RECOMMEND_SECONDARY: &str = "impact.user.recommend_secondary";
pub const CRITIQUE_PRIMARY: &str = "impact.user.critique_primary";
pub const CRITIQUE_SECONDARY: &str = "impact.user.critique_secondary";

/// Register every pipeline prompt with the given registry
///
/// # Example
///
/// ```
/// use impact_pipeline::prompts::register_prompts;
/// use impact_prompt::{Language, PromptRegistry};
///
/// let registry = PromptRegistry::with_language(Language::Korean);
/// register_prompts(&registry).unwrap();
/// assert!(registry.contains("impact.system.primary_critic"));
/// ```
pub fn register_prompts(registry: &PromptRegistry) -> Result<()> {
    registry.register(summarizer()?);
    registry.register(primary_recommender()?);
    registry.register(secondary_recommender()?);
    registry.register(primary_critic()?);
    registry.register(secondary_critic()?);

    registry.register(summarize_prompt()?);
    registry.register(recommend_primary_prompt()?);
    registry.register(recommend_secondary_prompt()?);
    registry.register(critique_primary_prompt()?);
    registry.register(critique_secondary_prompt()?);

    Ok(())
}
