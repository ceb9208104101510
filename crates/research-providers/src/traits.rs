use async_trait::async_trait;
use research_core::models::{ProviderCallStatus, SearchHit};

/// Unified interface for web-search providers (C1, §4.1).
///
/// Each adapter is stateless aside from the degraded-mode latch
/// [`crate::harness::DegradedLatch`] owns on its behalf; adapters never
/// retry internally, never mutate shared state beyond that latch, and never
/// return an `Err` for an ordinary empty or rate-limited response — those
/// are reported through `status`, not the `Result`'s error channel.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Stable identifier used for trust-weight lookup, history rows, and
    /// round-robin assignment (e.g. `"perplexity"`, `"jina"`).
    fn name(&self) -> &str;

    /// Run one search call. `language` is a semantic language code; the
    /// adapter is responsible for mapping it to whatever locale/country
    /// parameter its own API expects.
    async fn search(
        &self,
        query: &str,
        language: &str,
        max_results: usize,
    ) -> (Vec<SearchHit>, ProviderCallStatus);

    /// Whether this adapter's degraded latch is currently set (§4.1).
    fn is_degraded(&self) -> bool;
}
