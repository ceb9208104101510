//! Perplexity adapter (§4.1). Perplexity has no structured search endpoint:
//! it's a chat-completion model prompted to list sources, so this adapter
//! parses `Title - URL - description` lines out of the completion text.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use research_core::models::{ProviderCallStatus, SearchHit};

use crate::error::ProviderError;
use crate::harness::{self, DegradedLatch, DEFAULT_DESCRIPTION_CAP};
use crate::traits::SearchProvider;

const BASE_URL: &str = "https://api.perplexity.ai";
const MODEL: &str = "sonar";

fn language_name(code: &str) -> &str {
    match code {
        "pt" => "Portuguese",
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        other => other,
    }
}

pub struct PerplexityProvider {
    http: reqwest::Client,
    api_key: String,
    latch: DegradedLatch,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl PerplexityProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("reqwest client builds"),
            api_key,
            latch: DegradedLatch::new(),
        }
    }

    async fn call(&self, query: &str, language: &str) -> Result<Vec<SearchHit>, ProviderError> {
        let prompt = format!(
            "Search for: {query}\n\nIMPORTANT: Your response MUST be ENTIRELY in {}. \
            List sources formatted as: Title - URL - Brief description",
            language_name(language)
        );
        let request =
            ChatRequest { model: MODEL, messages: vec![ChatMessage { role: "user", content: &prompt }] };

        let response = self
            .http
            .post(format!("{BASE_URL}/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from(
                response.error_for_status().unwrap_err(),
            ));
        }

        let parsed: ChatResponse = response.json().await.map_err(ProviderError::from)?;
        let content = parsed.choices.into_iter().next().map(|c| c.message.content).unwrap_or_default();
        Ok(parse_sources(&content))
    }
}

fn parse_sources(content: &str) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    let mut pending_title = String::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !line.to_lowercase().contains("http") {
            pending_title = line.chars().take(100).collect();
            continue;
        }
        let Some(url) = line.split_whitespace().find(|w| w.to_lowercase().contains("http")) else {
            continue;
        };
        let url = url.trim_matches(|c| "()[].,".contains(c)).to_string();

        let (title, description) = if line.contains('|') {
            let parts: Vec<&str> = line.split('|').map(|p| p.trim()).filter(|p| !p.is_empty()).collect();
            let parts: Vec<&str> = parts.into_iter().filter(|p| !p.to_lowercase().contains("http")).collect();
            match parts.as_slice() {
                [] => (pending_title.clone(), line.to_string()),
                [only] => (only.to_string(), only.to_string()),
                [first, rest @ ..] => (first.to_string(), rest.join(" ")),
            }
        } else {
            (pending_title.clone(), line.to_string())
        };

        let title = if title.is_empty() { "Perplexity result".to_string() } else { title };
        hits.push(SearchHit { title, description, url, published_at: None, provider: "perplexity".to_string() });
        pending_title.clear();
    }
    hits
}

#[async_trait]
impl SearchProvider for PerplexityProvider {
    fn name(&self) -> &str {
        "perplexity"
    }

    async fn search(
        &self,
        query: &str,
        language: &str,
        max_results: usize,
    ) -> (Vec<SearchHit>, ProviderCallStatus) {
        if self.latch.is_set() {
            return (Vec::new(), ProviderCallStatus::Ok);
        }

        match self.call(query, language).await {
            Ok(hits) => {
                let hits = harness::finalize_hits(hits, DEFAULT_DESCRIPTION_CAP);
                let hits: Vec<_> = hits.into_iter().take(max_results).collect();
                if hits.is_empty() {
                    (hits, ProviderCallStatus::Empty)
                } else {
                    (hits, ProviderCallStatus::Ok)
                }
            }
            Err(ProviderError::QuotaExhausted) => {
                self.latch.set();
                (Vec::new(), ProviderCallStatus::QuotaExhausted)
            }
            Err(ProviderError::RateLimitExceeded) => {
                self.latch.set();
                (Vec::new(), ProviderCallStatus::RateLimited)
            }
            Err(ProviderError::AuthenticationFailed(_)) => (Vec::new(), ProviderCallStatus::AuthFailed),
            Err(_) => (Vec::new(), ProviderCallStatus::TransportError),
        }
    }

    fn is_degraded(&self) -> bool {
        self.latch.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_piped_source_lines() {
        let content = "| Access to Credit Guide | https://example.org/credit | Great overview |";
        let hits = parse_sources(content);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://example.org/credit");
        assert_eq!(hits[0].title, "Access to Credit Guide");
    }

    #[test]
    fn ignores_lines_without_urls() {
        let hits = parse_sources("just some prose\nwith no links at all");
        assert!(hits.is_empty());
    }
}
