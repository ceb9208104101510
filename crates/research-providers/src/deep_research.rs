//! Deep Research adapter (§4.1), disabled by default. The original integration
//! delegates to an external MCP tool call rather than a plain HTTP API; there
//! is no equivalent network endpoint to call directly here, so this adapter
//! is a stub that always reports an empty, non-degraded result. It exists so
//! the provider registry and queue-assignment round-robin can name and skip
//! it like any other adapter, matching how the original treats it as present
//! but never enabled.

use async_trait::async_trait;

use research_core::models::{ProviderCallStatus, SearchHit};

use crate::traits::SearchProvider;

pub struct DeepResearchProvider;

impl DeepResearchProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeepResearchProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DeepResearchProvider {
    fn name(&self) -> &str {
        "deep_research"
    }

    async fn search(
        &self,
        _query: &str,
        _language: &str,
        _max_results: usize,
    ) -> (Vec<SearchHit>, ProviderCallStatus) {
        (Vec::new(), ProviderCallStatus::Empty)
    }

    fn is_degraded(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_returns_empty() {
        let provider = DeepResearchProvider::new();
        let (hits, status) = provider.search("anything", "en", 5).await;
        assert!(hits.is_empty());
        assert_eq!(status, ProviderCallStatus::Empty);
    }
}
