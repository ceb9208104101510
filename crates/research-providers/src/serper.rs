use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use research_core::models::{ProviderCallStatus, SearchHit};

use crate::error::ProviderError;
use crate::harness::{self, DegradedLatch, DEFAULT_DESCRIPTION_CAP};
use crate::traits::SearchProvider;

const BASE_URL: &str = "https://google.serper.dev";

fn country_code(language: &str) -> &str {
    match language {
        "pt" => "br",
        "en" => "us",
        "es" => "es",
        "fr" => "fr",
        "de" => "de",
        "it" => "it",
        other => other,
    }
}

pub struct SerperProvider {
    http: reqwest::Client,
    api_key: String,
    latch: DegradedLatch,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    num: usize,
    gl: &'a str,
    hl: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Deserialize)]
struct OrganicResult {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

impl SerperProvider {
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

    async fn call(
        &self,
        query: &str,
        language: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        let request = SearchRequest { q: query, num: max_results, gl: country_code(language), hl: language };

        let response = self
            .http
            .post(format!("{BASE_URL}/search"))
            .header("X-API-KEY", &self.api_key)
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ProviderError::from(response.error_for_status().unwrap_err()));
        }

        let parsed: SearchResponse = response.json().await.map_err(ProviderError::from)?;
        Ok(parsed
            .organic
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                description: r.snippet,
                url: r.link,
                published_at: None,
                provider: "serper".to_string(),
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for SerperProvider {
    fn name(&self) -> &str {
        "serper"
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
        match self.call(query, language, max_results).await {
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
