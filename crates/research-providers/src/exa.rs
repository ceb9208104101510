//! Exa adapter (§4.1), enabled by default. Exa's neural search ignores the
//! `language` hint entirely — its own docs say it searches across languages
//! automatically — so it's accepted but unused here, same simplification as
//! the Tavily adapter.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use research_core::models::{ProviderCallStatus, SearchHit};

use crate::error::ProviderError;
use crate::harness::{self, DegradedLatch, DEFAULT_DESCRIPTION_CAP};
use crate::traits::SearchProvider;

const BASE_URL: &str = "https://api.exa.ai";

pub struct ExaProvider {
    http: reqwest::Client,
    api_key: String,
    latch: DegradedLatch,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(rename = "numResults")]
    num_results: usize,
    #[serde(rename = "type")]
    search_type: &'a str,
    contents: Contents,
}

#[derive(Serialize)]
struct Contents {
    text: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ResultItem>,
}

#[derive(Deserialize)]
struct ResultItem {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    text: String,
    #[serde(rename = "publishedDate", default)]
    published_date: Option<String>,
}

impl ExaProvider {
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

    async fn call(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ProviderError> {
        let request = SearchRequest {
            query,
            num_results: max_results.min(100),
            search_type: "auto",
            contents: Contents { text: true },
        };

        let response = self
            .http
            .post(format!("{BASE_URL}/search"))
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from(response.error_for_status().unwrap_err()));
        }

        let parsed: SearchResponse = response.json().await.map_err(ProviderError::from)?;
        Ok(parsed
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                description: truncate_text(&r.text, DEFAULT_DESCRIPTION_CAP),
                url: r.url,
                published_at: r
                    .published_date
                    .and_then(|d| chrono::DateTime::parse_from_rfc3339(&d).ok())
                    .map(|d| d.with_timezone(&chrono::Utc)),
                provider: "exa".to_string(),
            })
            .collect())
    }
}

fn truncate_text(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        text.to_string()
    } else {
        text.chars().take(cap).collect()
    }
}

#[async_trait]
impl SearchProvider for ExaProvider {
    fn name(&self) -> &str {
        "exa"
    }

    async fn search(
        &self,
        query: &str,
        _language: &str,
        max_results: usize,
    ) -> (Vec<SearchHit>, ProviderCallStatus) {
        if self.latch.is_set() {
            return (Vec::new(), ProviderCallStatus::Ok);
        }

        match self.call(query, max_results).await {
            Ok(hits) => {
                let hits = harness::finalize_hits(hits, DEFAULT_DESCRIPTION_CAP);
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
