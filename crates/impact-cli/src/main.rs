//! `impact`: run one news impact analysis from local files
//!
//! # Usage
//!
//! ```bash
//! export OPENAI_API_KEY="sk-..."
//! export IMPACT_RECOMMENDER_MODEL="gpt-4o"
//! export IMPACT_CRITIC_MODEL="gpt-4o-mini"
//!
//! impact --news news.json --prices prices/ --out reports/
//! ```

mod prices;
mod render;
mod store;

use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use impact_llm::providers::{OpenAIConfig, OpenAIProvider};
use impact_llm::{LLMProvider, ProviderEngine};
use impact_pipeline::{
    CachedPriceProvider, Language, NewsItem, Orchestrator, PipelineConfig, PipelineError,
};
use prices::FilePriceProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use store::JsonFileReportStore;
use tracing::{error, info};

const DEFAULT_RECOMMENDER_MODEL: &str = "gpt-4o";
const DEFAULT_CRITIC_MODEL: &str = "gpt-4o-mini";

/// Languages the bundled prompts are written in
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum PromptLanguage {
    En,
    Ko,
}

impl From<PromptLanguage> for Language {
    fn from(language: PromptLanguage) -> Self {
        match language {
            PromptLanguage::En => Language::English,
            PromptLanguage::Ko => Language::Korean,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "impact")]
#[command(version, about = "Analyse which listed equities a news batch moves", long_about = None)]
struct Args {
    /// JSON array of news items ({title, source, body})
    #[arg(long)]
    news: PathBuf,

    /// Directory holding one `<code>.json` bar array per equity
    #[arg(long)]
    prices: PathBuf,

    /// Directory the report is written to
    #[arg(long, default_value = "reports")]
    out: PathBuf,

    /// Analysis date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Prompt language
    #[arg(long, value_enum)]
    language: Option<PromptLanguage>,

    #[arg(long)]
    max_retry: Option<u32>,

    #[arg(long)]
    primary_count: Option<usize>,

    #[arg(long)]
    secondary_count: Option<usize>,

    /// Abort the run after this many seconds
    #[arg(long, default_value_t = 300)]
    deadline_secs: u64,

    /// Timeout for a single model request, capped by the deadline
    #[arg(long, default_value_t = 60)]
    request_timeout_secs: u64,

    /// Print the final state as JSON instead of tables
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Environment configuration with command-line overrides applied
    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = PipelineConfig::from_env()?;
        if let Some(language) = self.language {
            config.language = language.into();
        }
        if let Some(max_retry) = self.max_retry {
            config.max_retry = max_retry;
        }
        if let Some(count) = self.primary_count {
            config.primary_count = count;
        }
        if let Some(count) = self.secondary_count {
            config.secondary_count = count;
        }
        config.validate()?;
        Ok(config)
    }

    fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs.min(self.deadline_secs)
    }
}

fn model_from_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

async fn load_news(path: &Path) -> anyhow::Result<Vec<NewsItem>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read news file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a news array", path.display()))
}

fn build_orchestrator(args: &Args) -> anyhow::Result<Orchestrator> {
    let config = args.pipeline_config()?;

    let openai = OpenAIConfig::from_env()?.with_timeout(args.request_timeout_secs());
    let provider: Arc<dyn LLMProvider> = Arc::new(
        OpenAIProvider::with_config(openai).context("cannot create the OpenAI provider")?,
    );
    let recommender_model = model_from_env("IMPACT_RECOMMENDER_MODEL", DEFAULT_RECOMMENDER_MODEL);
    let critic_model = model_from_env("IMPACT_CRITIC_MODEL", DEFAULT_CRITIC_MODEL);
    info!(%recommender_model, %critic_model, "engines configured");

    let prices = CachedPriceProvider::new(Arc::new(FilePriceProvider::new(&args.prices)));

    Ok(Orchestrator::builder()
        .recommender_engine(Arc::new(ProviderEngine::new(
            Arc::clone(&provider),
            recommender_model,
        )))
        .critic_engine(Arc::new(ProviderEngine::new(provider, critic_model)))
        .price_provider(Arc::new(prices))
        .config(config)
        .build()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    impact_utils::init_tracing();

    let args = Args::parse();
    let news = load_news(&args.news).await?;
    let orchestrator = build_orchestrator(&args)?;
    let store = JsonFileReportStore::new(&args.out);
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());

    info!(items = news.len(), %date, "starting analysis");

    let deadline = Duration::from_secs(args.deadline_secs);
    let state = match tokio::time::timeout(deadline, orchestrator.run(news)).await {
        Ok(Ok(state)) => state,
        Ok(Err(e)) => {
            error!(error = %e, "analysis failed");
            return Err(e.into());
        }
        Err(_) => bail!("analysis exceeded the {}s deadline", args.deadline_secs),
    };

    let outcome = match orchestrator.persist(state, date, &store).await {
        Ok(outcome) => outcome,
        Err(PipelineError::Persistence { state, source }) => {
            error!(run_id = %state.run_id(), error = %source, "analysis finished but was not saved");
            print_state(&state, args.json)?;
            bail!("report not persisted: {source}");
        }
        Err(e) => return Err(e.into()),
    };

    print_state(&outcome.state, args.json)?;
    println!(
        "\nReport {} written to {}",
        outcome.report_id,
        store.path_for(&outcome.report_id).display()
    );
    info!(report_id = %outcome.report_id, dir = %store.dir().display(), "done");
    Ok(())
}

fn print_state(state: &impact_pipeline::PipelineState, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }

    println!("{}", render::summary_table(state));
    println!("\nFirst-order equities");
    println!("{}", render::primary_table(state));
    println!("\nRipple effects");
    println!("{}", render::ripple_table(state));

    if !state.warnings().is_empty() {
        println!("\nWarnings");
        for warning in state.warnings() {
            println!("  - {warning}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "impact",
            "--news",
            "news.json",
            "--prices",
            "prices",
            "--date",
            "2024-10-11",
            "--max-retry",
            "2",
            "--json",
        ])
        .unwrap();

        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 10, 11));
        assert_eq!(args.max_retry, Some(2));
        assert_eq!(args.deadline_secs, 300);
        assert_eq!(args.request_timeout_secs(), 60);
        assert_eq!(args.out, PathBuf::from("reports"));
        assert_eq!(args.language, None);
        assert!(args.json);
    }

    #[test]
    fn test_language_limited_to_bundled_prompts() {
        let args = Args::try_parse_from([
            "impact", "--news", "n.json", "--prices", "p", "--language", "ko",
        ])
        .unwrap();
        assert_eq!(args.language.map(Language::from), Some(Language::Korean));

        let err = Args::try_parse_from([
            "impact", "--news", "n.json", "--prices", "p", "--language", "kr",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_request_timeout_capped_by_deadline() {
        let args = Args::try_parse_from([
            "impact", "--news", "n.json", "--prices", "p", "--deadline-secs", "20",
        ])
        .unwrap();
        assert_eq!(args.request_timeout_secs(), 20);

        let args = Args::try_parse_from([
            "impact",
            "--news",
            "n.json",
            "--prices",
            "p",
            "--request-timeout-secs",
            "15",
        ])
        .unwrap();
        assert_eq!(args.request_timeout_secs(), 15);
    }

    #[test]
    fn test_news_and_prices_are_required() {
        assert!(Args::try_parse_from(["impact", "--news", "news.json"]).is_err());
    }

    #[tokio::test]
    async fn test_load_news_accepts_content_alias() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"title": "Base rate cut", "source": "Yonhap", "content": "The bank cut rates."}}]"#
        )
        .unwrap();

        let news = load_news(file.path()).await.unwrap();
        assert_eq!(news.len(), 1);
        assert_eq!(news[0].body, "The bank cut rates.");
    }
}
