//! Adaptive Search Executor (C9, §4.9).
//!
//! One queue item drives one run: iterate providers in order, stopping
//! early once the quality-of-set appraisal (C5) says so. The non-adaptive
//! path is this same loop with `min_calls = max_calls = |provider_order|`
//! and the quality check short-circuited (§11.3), so there is exactly one
//! executor, not two.

use std::sync::Arc;
use std::time::Duration;

use research_core::models::{ProviderCallStatus, SearchHit};
use research_core::scorer::{self, AppraisalInput, Recommendation};
use research_providers::SearchProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QualityThresholdMet,
    MaybeAfterMinimum,
    MaxReached,
    ProvidersExhausted,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::QualityThresholdMet => "quality_threshold_met",
            StopReason::MaybeAfterMinimum => "maybe_after_minimum",
            StopReason::MaxReached => "max_reached",
            StopReason::ProvidersExhausted => "providers_exhausted",
        }
    }
}

pub struct ExecutorConfig {
    pub min_calls: usize,
    pub max_calls: usize,
    pub min_quality: f64,
    pub adaptive_enabled: bool,
    pub inter_call_delay: Duration,
}

impl ExecutorConfig {
    /// Non-adaptive mode expressed as the adaptive executor's degenerate
    /// case (§11.3): every configured provider is called, no early stop.
    pub fn non_adaptive(provider_count: usize, inter_call_delay: Duration) -> Self {
        Self {
            min_calls: provider_count,
            max_calls: provider_count,
            min_quality: 0.0,
            adaptive_enabled: false,
            inter_call_delay,
        }
    }
}

pub struct ExecutionOutcome {
    pub hits: Vec<SearchHit>,
    pub num_calls: usize,
    pub final_quality: f64,
    pub stop_reason: StopReason,
    /// One row per provider actually called this run (§11.1 history feed).
    pub call_log: Vec<(String, ProviderCallStatus)>,
}

/// Run C9 for one (query, language) pair against `providers` in order,
/// scoring accumulated hits against `query` as it goes so the appraisal can
/// reflect what's been gathered so far.
pub async fn run(
    providers: &[Arc<dyn SearchProvider>],
    query: &str,
    language: &str,
    max_results_per_call: usize,
    config: &ExecutorConfig,
) -> ExecutionOutcome {
    let mut hits = Vec::new();
    let mut call_log = Vec::new();
    let mut scored_so_far: Vec<AppraisalInput> = Vec::new();
    let mut calls_made = 0usize;
    let mut final_quality = 0.0;
    let mut stop_reason = StopReason::ProvidersExhausted;

    for provider in providers {
        if provider.is_degraded() {
            tracing::debug!(provider = provider.name(), "skipping degraded provider");
            continue;
        }

        let (mut new_hits, status) = provider.search(query, language, max_results_per_call).await;
        calls_made += 1;
        call_log.push((provider.name().to_string(), status));

        for hit in &new_hits {
            let score = scorer::score(
                &scorer::ScoreInput {
                    title: &hit.title,
                    description: &hit.description,
                    url: &hit.url,
                    query,
                    provider: provider.name(),
                    occurrences: 1,
                },
                None,
            );
            scored_so_far.push(AppraisalInput { score, provider: provider.name() });
        }
        hits.append(&mut new_hits);

        if calls_made >= config.max_calls {
            stop_reason = StopReason::MaxReached;
            break;
        }

        if config.adaptive_enabled && calls_made >= config.min_calls {
            let appraisal = scorer::appraise_quality(&scored_so_far, config.min_quality);
            final_quality = appraisal.overall_quality;
            match appraisal.recommendation {
                Recommendation::Stop => {
                    stop_reason = StopReason::QualityThresholdMet;
                    break;
                }
                Recommendation::Maybe if calls_made > config.min_calls => {
                    stop_reason = StopReason::MaybeAfterMinimum;
                    break;
                }
                _ => {}
            }
        }

        tokio::time::sleep(config.inter_call_delay).await;
    }

    if scored_so_far.is_empty() {
        final_quality = 0.0;
    } else if final_quality == 0.0 {
        let appraisal = scorer::appraise_quality(&scored_so_far, config.min_quality);
        final_quality = appraisal.overall_quality;
    }

    ExecutionOutcome { hits, num_calls: calls_made, final_quality, stop_reason, call_log }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_providers::mock::MockSearchProvider;

    fn hit(title: &str, provider: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            description: "credit access for startups and financing options".to_string(),
            url: "https://example.org/credit".to_string(),
            published_at: None,
            provider: provider.to_string(),
        }
    }

    #[tokio::test]
    async fn stops_early_when_quality_threshold_met() {
        let a: Arc<dyn SearchProvider> = Arc::new(
            MockSearchProvider::new("perplexity")
                .with_hits(vec![hit("startup credit financing guide", "perplexity"), hit("startup credit access", "perplexity")]),
        );
        let b: Arc<dyn SearchProvider> = Arc::new(MockSearchProvider::new("jina").with_hits(vec![hit("unrelated", "jina")]));
        let providers = vec![a, b];

        let config = ExecutorConfig {
            min_calls: 1,
            max_calls: 5,
            min_quality: 0.1,
            adaptive_enabled: true,
            inter_call_delay: Duration::from_millis(0),
        };

        let outcome = run(&providers, "startup credit financing", "en", 10, &config).await;
        assert_eq!(outcome.num_calls, 1);
        assert!(matches!(outcome.stop_reason, StopReason::QualityThresholdMet | StopReason::MaybeAfterMinimum));
    }

    #[tokio::test]
    async fn non_adaptive_calls_every_provider() {
        let a: Arc<dyn SearchProvider> = Arc::new(MockSearchProvider::new("perplexity").with_hits(vec![hit("x", "perplexity")]));
        let b: Arc<dyn SearchProvider> = Arc::new(MockSearchProvider::new("jina").with_hits(vec![hit("y", "jina")]));
        let providers = vec![a, b];

        let config = ExecutorConfig::non_adaptive(providers.len(), Duration::from_millis(0));
        let outcome = run(&providers, "startup credit", "en", 10, &config).await;
        assert_eq!(outcome.num_calls, 2);
        assert_eq!(outcome.stop_reason, StopReason::MaxReached);
    }

    #[tokio::test]
    async fn degraded_providers_are_skipped() {
        let a: Arc<dyn SearchProvider> = Arc::new(MockSearchProvider::new("perplexity").with_degraded(true));
        let b: Arc<dyn SearchProvider> = Arc::new(MockSearchProvider::new("jina").with_hits(vec![hit("x", "jina")]));
        let providers = vec![a, b];

        let config = ExecutorConfig::non_adaptive(providers.len(), Duration::from_millis(0));
        let outcome = run(&providers, "startup credit", "en", 10, &config).await;
        assert_eq!(outcome.num_calls, 1);
        assert_eq!(outcome.call_log[0].0, "jina");
    }
}
