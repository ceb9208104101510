use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use research_core::models::{ProviderCallStatus, SearchHit};

use crate::error::ProviderError;
use crate::harness::{self, DegradedLatch, DEFAULT_DESCRIPTION_CAP};
use crate::traits::SearchProvider;

const BASE_URL: &str = "https://api.tavily.com";

pub struct TavilyProvider {
    http: reqwest::Client,
    api_key: String,
    latch: DegradedLatch,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    include_answer: bool,
    max_results: usize,
    topic: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ResultItem>,
}

#[derive(Deserialize)]
struct ResultItem {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilyProvider {
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
            api_key: &self.api_key,
            query,
            include_answer: true,
            max_results,
            topic: "general",
        };

        let response = self.http.post(format!("{BASE_URL}/search")).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from(response.error_for_status().unwrap_err()));
        }

        let parsed: SearchResponse = response.json().await.map_err(ProviderError::from)?;
        Ok(parsed
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                description: r.content,
                url: r.url,
                published_at: None,
                provider: "tavily".to_string(),
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    fn name(&self) -> &str {
        "tavily"
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
