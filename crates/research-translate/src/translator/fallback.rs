use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::translator::gateway::GatewayClient;

const TRANSLATE_SYSTEM_PROMPT: &str = "You are a precise translator. Respond with the translated \
text only, no preamble, no quotation marks, no explanation.";

const ANALYSIS_SYSTEM_PROMPT: &str = "You are a careful research analyst. Respond with your \
analysis only, no preamble.";

/// Tries an ordered list of models until one returns non-empty output,
/// mirroring the tiered-fallback idiom of translation provider routers, but
/// over LLM-gateway model identifiers rather than separate provider APIs
/// (§4.2: "tried strictly in order; the first to return non-empty text
/// wins").
pub struct ModelFallbackRouter {
    client: GatewayClient,
    free_models: Vec<String>,
    premium_models: Vec<String>,
}

impl ModelFallbackRouter {
    pub fn new(client: GatewayClient, free_models: Vec<String>, premium_models: Vec<String>) -> Self {
        Self { client, free_models, premium_models }
    }

    /// Try the free-tier models in order for a plain translation prompt.
    /// Fails (never escalates to the premium tier) if every free-tier model
    /// returns empty output or errors.
    pub async fn translate(&self, prompt: &str) -> Result<String> {
        self.try_tier(&self.free_models, TRANSLATE_SYSTEM_PROMPT, prompt).await
    }

    /// Premium-tier completion for analysis the caller explicitly asked to
    /// be "deep" — never reached automatically from [`Self::translate`].
    pub async fn analyze_deep(&self, prompt: &str) -> Result<String> {
        self.try_tier(&self.premium_models, ANALYSIS_SYSTEM_PROMPT, prompt).await
    }

    async fn try_tier(&self, models: &[String], system: &str, prompt: &str) -> Result<String> {
        if models.is_empty() {
            return Err(Error::Config("no models configured for this tier".to_string()));
        }

        let mut last_error = None;
        for (index, model) in models.iter().enumerate() {
            match self.client.complete(model, system, prompt).await {
                Ok(text) if !text.is_empty() => {
                    if index > 0 {
                        warn!("used fallback model {} after {} failure(s)", model, index);
                    }
                    return Ok(text);
                }
                Ok(_) => {
                    info!("model {} returned empty output, trying next", model);
                }
                Err(e) => {
                    warn!("model {} failed: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::Translation("every model in tier returned empty output".to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_empty_tier() {
        let client = GatewayClient::new(
            "http://localhost".to_string(),
            "key".to_string(),
            std::time::Duration::from_secs(1),
        )
        .unwrap();
        let router = ModelFallbackRouter::new(client, vec![], vec!["m".to_string()]);
        assert!(router.translate("hi").await.is_err());
    }
}
