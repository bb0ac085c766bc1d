//! Ask a local OpenAI-compatible server for schema-shaped JSON
//!
//! Works with llama.cpp server, vLLM, LM Studio or Ollama's OpenAI endpoint.
//!
//! ```bash
//! export OPENAI_API_BASE="http://localhost:1234/v1"
//! export OPENAI_MODEL="qwen2.5-7b-instruct"
//! cargo run -p impact-llm --example structured_local
//! ```

use impact_llm::providers::{OpenAIConfig, OpenAIProvider};
use impact_llm::{OutputSchema, ProviderEngine, StructuredCompletionEngine, StructuredRequest};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_base =
        std::env::var("OPENAI_API_BASE").unwrap_or_else(|_| "http://localhost:1234/v1".to_string());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "local-model".to_string());

    let config = OpenAIConfig::new("not-needed")
        .with_api_base(&api_base)
        .with_timeout(180);
    let engine = ProviderEngine::new(Arc::new(OpenAIProvider::with_config(config)?), model);

    let schema = OutputSchema::new(
        "headline_sentiment",
        json!({
            "type": "object",
            "properties": {
                "score": { "type": "number", "minimum": -1, "maximum": 1 },
                "reason": { "type": "string" }
            },
            "required": ["score", "reason"]
        }),
    );

    let request = StructuredRequest {
        system: "You rate the market sentiment of news headlines.".to_string(),
        prompt: "Headline: Bank of Korea cuts base rate by 25bp".to_string(),
        schema,
        temperature: 0.2,
        max_tokens: 256,
    };

    println!("Asking {} at {api_base}...", engine.model());
    match engine.complete(request).await {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(e) => println!("failed ({}): {e}", e.kind()),
    }

    Ok(())
}
