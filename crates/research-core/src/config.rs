//! Layered configuration surface (SPEC_FULL §10.3, §6).
//!
//! Loaded once at startup: a `.env` file via `dotenvy` feeds process
//! environment variables, which are read here into one typed struct.
//! Required keys missing at startup are a `Fatal` condition (§7), reported
//! before any worker starts — not a silently-applied default.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{ResearchError, ResearchResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database_url: String,

    // Provider API keys. jina/perplexity are required by the source system;
    // the rest are optional and the corresponding adapter is simply absent
    // from the factory when unset.
    pub jina_api_key: String,
    pub perplexity_api_key: String,
    pub tavily_api_key: Option<String>,
    pub serper_api_key: Option<String>,
    pub exa_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub openai_api_key: Option<String>,

    pub languages: Vec<String>,
    pub providers_enabled: HashMap<String, bool>,

    pub min_calls_per_query: u32,
    pub max_calls_per_query: u32,
    pub min_quality_to_stop: f64,
    pub adaptive_search_enabled: bool,

    pub max_workers: usize,
    pub min_inter_call_delay_secs: f64,
    pub max_requests_per_minute: u32,
    pub max_retries: u32,
    pub http_timeout_secs: u64,
    pub stuck_item_timeout_secs: u64,

    pub rag_enabled: bool,
    pub rag_similarity_threshold: f64,
    pub rag_dedup_threshold: f64,
    pub embedding_dim: usize,
    pub embedding_model: String,
    pub vector_store_enabled: bool,

    pub dedup_jaccard_threshold: f64,

    pub translation_models_free: Vec<String>,
    pub translation_models_premium: Vec<String>,

    pub min_confidence_threshold: f64,
    pub queries_per_failure: usize,

    pub test_mode_enabled: bool,
    pub test_mode_limit: Option<usize>,
}

impl Settings {
    /// Build settings from the process environment, applying `.env` first.
    /// Returns `Fatal` (via [`ResearchError::Config`]) if a required key is
    /// missing or malformed, rather than defaulting it away.
    pub fn from_env() -> ResearchResult<Self> {
        dotenvy::dotenv().ok();

        let required = |key: &str| -> ResearchResult<String> {
            std::env::var(key).map_err(|_| {
                ResearchError::Config(format!("{key} must be set"))
            })
        };
        let optional = |key: &str| std::env::var(key).ok();
        let with_default = |key: &str, default: &str| {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };
        let parse_with_default = |key: &str, default: &str| -> ResearchResult<f64> {
            with_default(key, default)
                .parse()
                .map_err(|_| ResearchError::Config(format!("{key} must be a number")))
        };
        let list_with_default = |key: &str, default: &[&str]| -> Vec<String> {
            std::env::var(key)
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| default.iter().map(|s| s.to_string()).collect())
        };

        let mut providers_enabled = HashMap::new();
        for (name, default_on) in [
            ("perplexity", true),
            ("jina", true),
            ("tavily", true),
            ("serper", true),
            ("exa", true),
            ("deep_research", false),
        ] {
            let env_key = format!("PROVIDER_{}_ENABLED", name.to_uppercase());
            let enabled = std::env::var(&env_key)
                .map(|v| v == "true" || v == "1")
                .unwrap_or(default_on);
            providers_enabled.insert(name.to_string(), enabled);
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,

            jina_api_key: required("JINA_API_KEY")?,
            perplexity_api_key: required("PERPLEXITY_API_KEY")?,
            tavily_api_key: optional("TAVILY_API_KEY"),
            serper_api_key: optional("SERPER_API_KEY"),
            exa_api_key: optional("EXA_API_KEY"),
            openrouter_api_key: optional("OPENROUTER_API_KEY"),
            openai_api_key: optional("OPENAI_API_KEY"),

            languages: list_with_default(
                "LANGUAGES",
                &["pt", "en", "es", "fr", "de", "it", "ar", "ja", "ko", "he"],
            ),
            providers_enabled,

            min_calls_per_query: with_default("MIN_CALLS_PER_QUERY", "2")
                .parse()
                .map_err(|_| ResearchError::Config("MIN_CALLS_PER_QUERY must be a number".into()))?,
            max_calls_per_query: with_default("MAX_CALLS_PER_QUERY", "8")
                .parse()
                .map_err(|_| ResearchError::Config("MAX_CALLS_PER_QUERY must be a number".into()))?,
            min_quality_to_stop: parse_with_default("MIN_QUALITY_TO_STOP", "0.75")?,
            adaptive_search_enabled: with_default("ADAPTIVE_SEARCH_ENABLED", "true") == "true",

            max_workers: with_default("MAX_WORKERS", "5")
                .parse()
                .map_err(|_| ResearchError::Config("MAX_WORKERS must be a number".into()))?,
            min_inter_call_delay_secs: parse_with_default("MIN_INTER_CALL_DELAY_SECS", "1.0")?,
            max_requests_per_minute: with_default("MAX_REQUESTS_PER_MINUTE", "60")
                .parse()
                .map_err(|_| {
                    ResearchError::Config("MAX_REQUESTS_PER_MINUTE must be a number".into())
                })?,
            max_retries: with_default("MAX_RETRIES", "3")
                .parse()
                .map_err(|_| ResearchError::Config("MAX_RETRIES must be a number".into()))?,
            http_timeout_secs: with_default("HTTP_TIMEOUT_SECS", "60")
                .parse()
                .map_err(|_| ResearchError::Config("HTTP_TIMEOUT_SECS must be a number".into()))?,
            stuck_item_timeout_secs: with_default("STUCK_ITEM_TIMEOUT_SECS", "600")
                .parse()
                .map_err(|_| {
                    ResearchError::Config("STUCK_ITEM_TIMEOUT_SECS must be a number".into())
                })?,

            rag_enabled: with_default("RAG_ENABLED", "true") == "true",
            rag_similarity_threshold: parse_with_default("RAG_SIMILARITY_THRESHOLD", "0.7")?,
            rag_dedup_threshold: parse_with_default("RAG_SIMILARITY_THRESHOLD_DEDUP", "0.85")?,
            embedding_dim: with_default("EMBEDDING_DIMENSION", "1536")
                .parse()
                .map_err(|_| ResearchError::Config("EMBEDDING_DIMENSION must be a number".into()))?,
            embedding_model: with_default("EMBEDDING_MODEL", "text-embedding-3-small"),
            vector_store_enabled: with_default("USAR_VECTOR_DB", "true") == "true",

            dedup_jaccard_threshold: parse_with_default("DEDUP_JACCARD_THRESHOLD", "0.80")?,

            translation_models_free: list_with_default(
                "TRANSLATION_MODELS_FREE",
                &["meta-llama/llama-3.1-8b-instruct:free", "google/gemma-2-9b-it:free"],
            ),
            translation_models_premium: list_with_default(
                "TRANSLATION_MODELS_PREMIUM",
                &["openai/gpt-4o", "anthropic/claude-3.5-sonnet"],
            ),

            min_confidence_threshold: parse_with_default("MIN_CONFIDENCE_THRESHOLD", "0.3")?,
            queries_per_failure: with_default("QUERIES_PER_FALHA", "5")
                .parse()
                .map_err(|_| ResearchError::Config("QUERIES_PER_FALHA must be a number".into()))?,

            test_mode_enabled: with_default("TEST_MODE_ENABLED", "false") == "true",
            test_mode_limit: optional("TEST_MODE_LIMIT").and_then(|v| v.parse().ok()),
        })
    }
}
