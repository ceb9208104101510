//! Mock search provider for testing.
//!
//! Configures canned responses for a [`SearchProvider`] without making
//! network calls, the same builder-configured-state pattern the teacher used
//! for its Git provider mock.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use research_core::models::{ProviderCallStatus, SearchHit};

use crate::traits::SearchProvider;

struct MockState {
    hits: Vec<SearchHit>,
    status: ProviderCallStatus,
    degraded: bool,
    calls: usize,
}

impl Default for MockState {
    fn default() -> Self {
        Self { hits: Vec::new(), status: ProviderCallStatus::Ok, degraded: false, calls: 0 }
    }
}

pub struct MockSearchProvider {
    name: String,
    state: Arc<Mutex<MockState>>,
}

impl MockSearchProvider {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), state: Arc::new(Mutex::new(MockState::default())) }
    }

    pub fn with_hits(self, hits: Vec<SearchHit>) -> Self {
        self.state.lock().unwrap().hits = hits;
        self
    }

    pub fn with_status(self, status: ProviderCallStatus) -> Self {
        self.state.lock().unwrap().status = status;
        self
    }

    pub fn with_degraded(self, degraded: bool) -> Self {
        self.state.lock().unwrap().degraded = degraded;
        self
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        _query: &str,
        _language: &str,
        max_results: usize,
    ) -> (Vec<SearchHit>, ProviderCallStatus) {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.degraded {
            return (Vec::new(), ProviderCallStatus::Ok);
        }
        let hits: Vec<_> = state.hits.iter().take(max_results).cloned().collect();
        (hits, state.status)
    }

    fn is_degraded(&self) -> bool {
        self.state.lock().unwrap().degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hit() -> SearchHit {
        SearchHit {
            title: "Sample".to_string(),
            description: "A sample hit".to_string(),
            url: "https://example.org/sample".to_string(),
            published_at: None,
            provider: "mock".to_string(),
        }
    }

    #[tokio::test]
    async fn returns_configured_hits() {
        let mock = MockSearchProvider::new("mock").with_hits(vec![sample_hit()]);
        let (hits, status) = mock.search("anything", "en", 5).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(status, ProviderCallStatus::Ok);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn degraded_mock_short_circuits() {
        let mock = MockSearchProvider::new("mock").with_hits(vec![sample_hit()]).with_degraded(true);
        let (hits, _) = mock.search("anything", "en", 5).await;
        assert!(hits.is_empty());
        assert!(mock.is_degraded());
    }

    #[tokio::test]
    async fn respects_max_results() {
        let mock = MockSearchProvider::new("mock").with_hits(vec![sample_hit(), sample_hit(), sample_hit()]);
        let (hits, _) = mock.search("anything", "en", 2).await;
        assert_eq!(hits.len(), 2);
    }
}
