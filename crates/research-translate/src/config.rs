use serde::{Deserialize, Serialize};

/// Gateway configuration: one API key, two model tiers. Free-tier models are
/// tried in order on every call; premium models are only reached through
/// [`crate::translator::ModelFallbackRouter::analyze_deep`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub api_key: String,
    pub base_url: String,
    #[serde(default = "default_free_models")]
    pub free_models: Vec<String>,
    #[serde(default = "default_premium_models")]
    pub premium_models: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GatewayConfig {
    pub fn from_env() -> crate::error::Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| crate::error::Error::Config("OPENROUTER_API_KEY must be set".to_string()))?;

        Ok(Self {
            api_key,
            base_url: std::env::var("OPENROUTER_BASE_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
            free_models: std::env::var("TRANSLATION_MODELS_FREE")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| default_free_models()),
            premium_models: std::env::var("TRANSLATION_MODELS_PREMIUM")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| default_premium_models()),
            timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| default_timeout_secs().to_string())
                .parse()
                .unwrap_or_else(|_| default_timeout_secs()),
        })
    }
}

fn default_free_models() -> Vec<String> {
    vec![
        "meta-llama/llama-3.1-8b-instruct:free".to_string(),
        "google/gemma-2-9b-it:free".to_string(),
    ]
}

fn default_premium_models() -> Vec<String> {
    vec![
        "openai/gpt-4o".to_string(),
        "anthropic/claude-3.5-sonnet".to_string(),
    ]
}

fn default_timeout_secs() -> u64 {
    60
}
