//! Configuration for pipeline runs

use crate::error::{PipelineError, Result};
use impact_prompt::Language;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sampling settings for one engine role
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineProfile {
    /// Sampling temperature
    pub temperature: f32,
    /// Generation limit per call
    pub max_tokens: usize,
}

impl EngineProfile {
    /// Create a profile
    pub const fn new(temperature: f32, max_tokens: usize) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// Configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of first-order equities to request
    pub primary_count: usize,

    /// Number of ripple effects to request
    pub secondary_count: usize,

    /// Critique budget per lane; a lane performs at most `max_retry + 1` critiques
    pub max_retry: u32,

    /// News items passed to the summarizer
    pub news_limit: usize,

    /// Characters kept from each news body
    pub news_body_chars: usize,

    /// Daily bars requested per equity
    pub price_lookback_days: usize,

    /// Minimum bars needed to score an equity
    pub min_price_bars: usize,

    /// Primary critic confidence below this is recorded as a warning
    pub primary_confidence_floor: f64,

    /// Secondary critic confidence below this is recorded as a warning
    pub secondary_confidence_floor: f64,

    /// Summarizer sampling
    pub summarizer: EngineProfile,

    /// Recommender sampling (both lanes)
    pub recommender: EngineProfile,

    /// Critic sampling (both lanes)
    pub critic: EngineProfile,

    /// Prompt language
    pub language: Language,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            primary_count: 3,
            secondary_count: 2,
            max_retry: 3,
            news_limit: 10,
            news_body_chars: 300,
            price_lookback_days: 100,
            min_price_bars: 30,
            primary_confidence_floor: 0.7,
            secondary_confidence_floor: 0.6,
            summarizer: EngineProfile::new(0.3, 1024),
            recommender: EngineProfile::new(0.5, 2048),
            critic: EngineProfile::new(0.1, 1024),
            language: Language::English,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Defaults overlaid with `IMPACT_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from an arbitrary lookup
    ///
    /// Recognised keys: `IMPACT_MAX_RETRY`, `IMPACT_PRIMARY_COUNT`,
    /// `IMPACT_SECONDARY_COUNT`, `IMPACT_PRICE_LOOKBACK`, `IMPACT_LANGUAGE`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("IMPACT_MAX_RETRY") {
            config.max_retry = parse_var("IMPACT_MAX_RETRY", &v)?;
        }
        if let Some(v) = lookup("IMPACT_PRIMARY_COUNT") {
            config.primary_count = parse_var("IMPACT_PRIMARY_COUNT", &v)?;
        }
        if let Some(v) = lookup("IMPACT_SECONDARY_COUNT") {
            config.secondary_count = parse_var("IMPACT_SECONDARY_COUNT", &v)?;
        }
        if let Some(v) = lookup("IMPACT_PRICE_LOOKBACK") {
            config.price_lookback_days = parse_var("IMPACT_PRICE_LOOKBACK", &v)?;
        }
        if let Some(v) = lookup("IMPACT_LANGUAGE") {
            config.language = Language::from_code(&v);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.primary_count == 0 || self.secondary_count == 0 {
            return Err(PipelineError::Config(
                "primary_count and secondary_count must be at least 1".to_string(),
            ));
        }

        if self.news_limit == 0 || self.news_body_chars == 0 {
            return Err(PipelineError::Config(
                "news_limit and news_body_chars must be at least 1".to_string(),
            ));
        }

        for (name, floor) in [
            ("primary_confidence_floor", self.primary_confidence_floor),
            ("secondary_confidence_floor", self.secondary_confidence_floor),
        ] {
            if !(0.0..=1.0).contains(&floor) {
                return Err(PipelineError::Config(format!(
                    "{name} must be within [0, 1], got {floor}"
                )));
            }
        }

        for (name, profile) in [
            ("summarizer", self.summarizer),
            ("recommender", self.recommender),
            ("critic", self.critic),
        ] {
            if !(0.0..=2.0).contains(&profile.temperature) || profile.max_tokens == 0 {
                return Err(PipelineError::Config(format!(
                    "{name} profile needs a temperature in [0, 2] and a positive token limit"
                )));
            }
        }

        if self.min_price_bars <= crate::screener::MA_PERIOD {
            return Err(PipelineError::Config(format!(
                "min_price_bars must exceed {}, got {}",
                crate::screener::MA_PERIOD,
                self.min_price_bars
            )));
        }

        if self.price_lookback_days < self.min_price_bars {
            return Err(PipelineError::Config(
                "price_lookback_days must be at least min_price_bars".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| PipelineError::Config(format!("invalid value '{value}' for {key}")))
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    primary_count: Option<usize>,
    secondary_count: Option<usize>,
    max_retry: Option<u32>,
    news_limit: Option<usize>,
    news_body_chars: Option<usize>,
    price_lookback_days: Option<usize>,
    min_price_bars: Option<usize>,
    primary_confidence_floor: Option<f64>,
    secondary_confidence_floor: Option<f64>,
    summarizer: Option<EngineProfile>,
    recommender: Option<EngineProfile>,
    critic: Option<EngineProfile>,
    language: Option<Language>,
}

impl PipelineConfigBuilder {
    /// Set the number of first-order equities
    pub fn primary_count(mut self, count: usize) -> Self {
        self.primary_count = Some(count);
        self
    }

    /// Set the number of ripple effects
    pub fn secondary_count(mut self, count: usize) -> Self {
        self.secondary_count = Some(count);
        self
    }

    /// Set the per-lane critique budget
    pub fn max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = Some(max_retry);
        self
    }

    /// Set how many news items reach the summarizer
    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    /// Set how many body characters are kept per item
    pub fn news_body_chars(mut self, chars: usize) -> Self {
        self.news_body_chars = Some(chars);
        self
    }

    /// Set the price lookback window
    pub fn price_lookback_days(mut self, days: usize) -> Self {
        self.price_lookback_days = Some(days);
        self
    }

    /// Set the minimum bar count for scoring
    pub fn min_price_bars(mut self, bars: usize) -> Self {
        self.min_price_bars = Some(bars);
        self
    }

    /// Set the primary low-confidence threshold
    pub fn primary_confidence_floor(mut self, floor: f64) -> Self {
        self.primary_confidence_floor = Some(floor);
        self
    }

    /// Set the secondary low-confidence threshold
    pub fn secondary_confidence_floor(mut self, floor: f64) -> Self {
        self.secondary_confidence_floor = Some(floor);
        self
    }

    /// Set the summarizer profile
    pub fn summarizer(mut self, profile: EngineProfile) -> Self {
        self.summarizer = Some(profile);
        self
    }

    /// Set the recommender profile
    pub fn recommender(mut self, profile: EngineProfile) -> Self {
        self.recommender = Some(profile);
        self
    }

    /// Set the critic profile
    pub fn critic(mut self, profile: EngineProfile) -> Self {
        self.critic = Some(profile);
        self
    }

    /// Set the prompt language
    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<PipelineConfig> {
        let defaults = PipelineConfig::default();

        let config = PipelineConfig {
            primary_count: self.primary_count.unwrap_or(defaults.primary_count),
            secondary_count: self.secondary_count.unwrap_or(defaults.secondary_count),
            max_retry: self.max_retry.unwrap_or(defaults.max_retry),
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
            news_body_chars: self.news_body_chars.unwrap_or(defaults.news_body_chars),
            price_lookback_days: self
                .price_lookback_days
                .unwrap_or(defaults.price_lookback_days),
            min_price_bars: self.min_price_bars.unwrap_or(defaults.min_price_bars),
            primary_confidence_floor: self
                .primary_confidence_floor
                .unwrap_or(defaults.primary_confidence_floor),
            secondary_confidence_floor: self
                .secondary_confidence_floor
                .unwrap_or(defaults.secondary_confidence_floor),
            summarizer: self.summarizer.unwrap_or(defaults.summarizer),
            recommender: self.recommender.unwrap_or(defaults.recommender),
            critic: self.critic.unwrap_or(defaults.critic),
            language: self.language.unwrap_or(defaults.language),
        };

        config.validate()?;
        Ok(config)
    }
}
