//! Jina adapter (§4.1). Jina's search endpoint is a GET against a query
//! baked into the path rather than a JSON body, and returns either a
//! structured JSON payload or plain text depending on content negotiation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use research_core::models::{ProviderCallStatus, SearchHit};

use crate::error::ProviderError;
use crate::harness::{self, DegradedLatch, DEFAULT_DESCRIPTION_CAP};
use crate::traits::SearchProvider;

const SEARCH_URL: &str = "https://s.jina.ai";

pub struct JinaProvider {
    http: reqwest::Client,
    api_key: String,
    latch: DegradedLatch,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<ResultItem>,
}

#[derive(Deserialize)]
struct ResultItem {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}

impl JinaProvider {
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
        let search_query = format!("{query} lang:{language}");
        let encoded = urlencode(&search_query);

        let response = self
            .http
            .get(format!("{SEARCH_URL}/{encoded}"))
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from(response.error_for_status().unwrap_err()));
        }

        let parsed: SearchResponse = response.json().await.map_err(|_| {
            ProviderError::InvalidResponse("Jina response was not valid JSON".to_string())
        })?;

        Ok(parsed
            .data
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                description: r.description,
                url: r.url,
                published_at: None,
                provider: "jina".to_string(),
            })
            .collect())
    }
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[async_trait]
impl SearchProvider for JinaProvider {
    fn name(&self) -> &str {
        "jina"
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
    fn urlencode_preserves_unreserved_chars() {
        assert_eq!(urlencode("abc-123_ABC.~"), "abc-123_ABC.~");
    }

    #[test]
    fn urlencode_escapes_spaces_and_colons() {
        assert_eq!(urlencode("a b:c"), "a%20b%3Ac");
    }
}
