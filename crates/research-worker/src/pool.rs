//! Worker pool (C10, §4.10, §5).
//!
//! Each worker drives one queue item at a time through claim -> validate ->
//! optional query translation -> C9 -> per-hit scoring/dedup/persist ->
//! terminal transition. A pool of `W` such loops runs concurrently; a
//! secondary recovery pass reverts stuck `in_progress` items to `pending`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Duration as ChronoDuration;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;

use research_core::dedup::{Candidate, DedupOutcome};
use research_core::language;
use research_core::models::{QueueItem, ResultRecord, VectorCollectionKind};
use research_core::scorer::{self, ScoreInput};
use research_core::services::Services;
use research_db::{FailureQueries, HistoryQueries, QueueQueries, ResultQueries};
use research_providers::SearchProvider;
use research_vector::VectorStore;

use crate::executor::{self, ExecutorConfig};

pub struct PoolConfig {
    pub worker_count: usize,
    pub min_calls: usize,
    pub max_calls: usize,
    pub min_quality: f64,
    pub adaptive_enabled: bool,
    pub inter_call_delay: Duration,
    pub max_requests_per_minute: u32,
    pub stuck_after: ChronoDuration,
    pub vector_store_enabled: bool,
    pub rag_enabled: bool,
    pub max_results_per_call: usize,
}

/// Sliding-window limiter shared across the whole pool (§5: "cap
/// requests-per-minute across the pool", not per-worker).
struct RateLimiter {
    max_per_minute: u32,
    timestamps: AsyncMutex<Vec<Instant>>,
}

impl RateLimiter {
    fn new(max_per_minute: u32) -> Self {
        Self { max_per_minute, timestamps: AsyncMutex::new(Vec::new()) }
    }

    async fn acquire(&self) {
        let mut timestamps = self.timestamps.lock().await;
        let now = Instant::now();
        timestamps.retain(|t| now.duration_since(*t) < Duration::from_secs(60));

        if timestamps.len() >= self.max_per_minute as usize {
            let oldest = timestamps[0];
            let wait = Duration::from_secs(60).saturating_sub(now.duration_since(oldest));
            if !wait.is_zero() {
                drop(timestamps);
                tokio::time::sleep(wait).await;
                timestamps = self.timestamps.lock().await;
            }
        }
        timestamps.push(Instant::now());
    }
}

#[derive(Default, Clone, Copy)]
pub struct PoolStats {
    pub processed: u64,
    pub errors: u64,
}

impl PoolStats {
    pub fn success_rate(&self) -> f64 {
        let total = self.processed + self.errors;
        if total == 0 {
            1.0
        } else {
            self.processed as f64 / total as f64
        }
    }
}

pub struct WorkerPool {
    db: DatabaseConnection,
    providers: Vec<Arc<dyn SearchProvider>>,
    services: Arc<Services>,
    vector_store: Option<Arc<VectorStore>>,
    rate_limiter: Arc<RateLimiter>,
    config: PoolConfig,
    active: Arc<AtomicBool>,
    stats: Arc<AsyncMutex<PoolStats>>,
}

impl WorkerPool {
    pub fn new(
        db: DatabaseConnection,
        providers: Vec<Arc<dyn SearchProvider>>,
        services: Arc<Services>,
        vector_store: Option<Arc<VectorStore>>,
        config: PoolConfig,
    ) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.max_requests_per_minute));
        Self {
            db,
            providers,
            services,
            vector_store,
            rate_limiter,
            config,
            active: Arc::new(AtomicBool::new(true)),
            stats: Arc::new(AsyncMutex::new(PoolStats::default())),
        }
    }

    pub fn active_flag(&self) -> Arc<AtomicBool> {
        self.active.clone()
    }

    pub async fn stats(&self) -> PoolStats {
        *self.stats.lock().await
    }

    /// Recovery pass (§4.10, §5): revert stuck `in_progress` items to
    /// `pending` and, when `active=false`, revert any currently claimed
    /// items too so no in-flight progress is lost on a graceful stop.
    pub async fn recover_stuck(&self) -> Result<u64, sea_orm::DbErr> {
        QueueQueries::recover_stuck(&self.db, self.config.stuck_after).await
    }

    /// Drain up to `limit` pending items concurrently across
    /// `config.worker_count` slots. Returns when the queue is empty or
    /// `limit` items have been claimed, whichever comes first.
    pub async fn process_batch(&self, limit: usize) -> PoolStats {
        let mut claimed = 0usize;
        let mut handles = Vec::new();

        while claimed < limit && self.active.load(Ordering::Relaxed) {
            let Ok(Some(item)) = QueueQueries::claim_next(&self.db).await else { break };
            claimed += 1;

            let pool = self.clone_handles();
            handles.push(tokio::spawn(async move { pool.process_claimed(item.into()).await }));

            if handles.len() >= self.config.worker_count {
                for h in handles.drain(..) {
                    let _ = h.await;
                }
            }
        }
        for h in handles {
            let _ = h.await;
        }
        self.stats().await
    }

    /// Run `config.worker_count` independent claim loops concurrently, each
    /// looping `claim_next` -> process until the queue has nothing left to
    /// claim (§6 CLI verb `process-parallel`). Unlike [`Self::process_batch`],
    /// which claims in windows of `worker_count` and waits for the whole
    /// window before claiming more, every slot here keeps claiming on its
    /// own as soon as it finishes its previous item.
    pub async fn process_parallel(&self) -> PoolStats {
        let mut handles = Vec::with_capacity(self.config.worker_count);
        for _ in 0..self.config.worker_count {
            let pool = self.clone_handles();
            let active = self.active.clone();
            let db = self.db.clone();
            handles.push(tokio::spawn(async move {
                while active.load(Ordering::Relaxed) {
                    let Ok(Some(item)) = QueueQueries::claim_next(&db).await else { break };
                    pool.process_claimed(item.into()).await;
                }
            }));
        }
        for h in handles {
            let _ = h.await;
        }
        self.stats().await
    }

    /// Process every pending item, reclaiming until the queue reports
    /// empty (§6 CLI verb `process-until-empty`).
    pub async fn process_until_empty(&self) -> PoolStats {
        loop {
            if !self.active.load(Ordering::Relaxed) {
                break;
            }
            let pending = QueueQueries::count_pending(&self.db).await.unwrap_or(0);
            if pending == 0 {
                break;
            }
            self.process_batch(pending as usize).await;
        }
        self.stats().await
    }

    fn clone_handles(&self) -> WorkerHandles {
        WorkerHandles {
            db: self.db.clone(),
            providers: self.providers.clone(),
            services: self.services.clone(),
            vector_store: self.vector_store.clone(),
            rate_limiter: self.rate_limiter.clone(),
            stats: self.stats.clone(),
            adaptive_enabled: self.config.adaptive_enabled,
            min_calls: self.config.min_calls,
            max_calls: self.config.max_calls,
            min_quality: self.config.min_quality,
            inter_call_delay: self.config.inter_call_delay,
            vector_store_enabled: self.config.vector_store_enabled,
            rag_enabled: self.config.rag_enabled,
            max_results_per_call: self.config.max_results_per_call,
        }
    }

}

/// Everything one worker task needs, cloned cheaply (all `Arc`s) so each
/// `tokio::spawn`ed item runs independently of `WorkerPool`'s own lifetime.
#[derive(Clone)]
struct WorkerHandles {
    db: DatabaseConnection,
    providers: Vec<Arc<dyn SearchProvider>>,
    services: Arc<Services>,
    vector_store: Option<Arc<VectorStore>>,
    rate_limiter: Arc<RateLimiter>,
    stats: Arc<AsyncMutex<PoolStats>>,
    adaptive_enabled: bool,
    min_calls: usize,
    max_calls: usize,
    min_quality: f64,
    inter_call_delay: Duration,
    vector_store_enabled: bool,
    rag_enabled: bool,
    max_results_per_call: usize,
}

impl WorkerHandles {
    async fn process_claimed(&self, item: QueueItem) {
        if let Err(reason) = item.validate() {
            tracing::warn!(item_id = item.id, %reason, "invalid queue item, marking error");
            let _ = QueueQueries::mark_invalid(&self.db, item.id).await;
            let _ = HistoryQueries::record(
                &self.db,
                item.failure_id,
                item.query_text.clone(),
                item.language.clone(),
                item.provider.clone(),
                "error".to_string(),
                0,
                Some(reason),
                None,
            )
            .await;
            let mut stats = self.stats.lock().await;
            stats.errors += 1;
            return;
        }

        let start = Instant::now();
        match self.run_item(&item).await {
            Ok(hits_found) => {
                let _ = QueueQueries::mark_done(&self.db, item.id).await;
                let _ = HistoryQueries::record(
                    &self.db,
                    item.failure_id,
                    item.query_text.clone(),
                    item.language.clone(),
                    item.provider.clone(),
                    "ok".to_string(),
                    hits_found as i32,
                    None,
                    Some(start.elapsed().as_secs_f64()),
                )
                .await;
                let mut stats = self.stats.lock().await;
                stats.processed += 1;
            }
            Err(err) => {
                tracing::error!(item_id = item.id, %err, "item processing failed");
                let _ = QueueQueries::mark_failed(&self.db, item.id).await;
                let _ = HistoryQueries::record(
                    &self.db,
                    item.failure_id,
                    item.query_text.clone(),
                    item.language.clone(),
                    item.provider.clone(),
                    "error".to_string(),
                    0,
                    Some(err.to_string()),
                    Some(start.elapsed().as_secs_f64()),
                )
                .await;
                let mut stats = self.stats.lock().await;
                stats.errors += 1;
            }
        }
    }

    async fn run_item(&self, item: &QueueItem) -> Result<usize, crate::error::Error> {
        let mut query_text = item.query_text.clone();

        // Translate the query first if it reads as PT but the item targets
        // another language (§4.10). The heuristic only gates whether we
        // bother calling the model at all; once we do, detect_and_translate
        // asks the model itself to confirm the source language rather than
        // trusting the heuristic's "pt" guess.
        if item.language != "pt" {
            let (detected, confidence) = language::detect(&query_text);
            if detected == "pt" && confidence >= language::CONFIDENCE_FLOOR {
                if let Some((translated, _detected_source)) = self
                    .services
                    .detect_and_translate_validated(&query_text, "pt", &item.language)
                    .await
                {
                    query_text = translated;
                }
            }
        }

        self.rate_limiter.acquire().await;

        let provider: Vec<Arc<dyn SearchProvider>> = self
            .providers
            .iter()
            .filter(|p| p.name() == item.provider)
            .cloned()
            .collect();

        // Each item is tied to the single provider it was enqueued against
        // (§4.8 round-robin assignment); C9's provider_order here is that
        // one-element (or empty, if disabled) list, so min/max_calls only
        // bound an already-trivial loop.
        let exec_config = ExecutorConfig {
            min_calls: self.min_calls,
            max_calls: self.max_calls,
            min_quality: self.min_quality,
            adaptive_enabled: self.adaptive_enabled,
            inter_call_delay: self.inter_call_delay,
        };

        let outcome =
            executor::run(&provider, &query_text, &item.language, self.max_results_per_call, &exec_config)
                .await;

        let mut persisted = 0usize;

        for hit in outcome.hits {
            // Cross-language contamination guard (§4.2, §4.10, §8 scenario 5).
            if item.language != "pt" {
                let (detected, confidence) =
                    language::detect(&format!("{} {}", hit.title, hit.description));
                if detected == "pt" && confidence >= language::CONTAMINATION_GUARD_CONFIDENCE {
                    tracing::debug!(item_id = item.id, "dropping contaminated hit");
                    continue;
                }
            }

            let score = scorer::score(
                &ScoreInput {
                    title: &hit.title,
                    description: &hit.description,
                    url: &hit.url,
                    query: &query_text,
                    provider: &hit.provider,
                    occurrences: 1,
                },
                None,
            );

            // The in-process Deduplicator only resolves which content_hash
            // this hit belongs to (exact or Jaccard match); the occurrence
            // boost itself is recomputed by upsert_by_content_hash from the
            // row's persisted occurrences, since this process's own
            // occurrence counter is unseeded and resets on every restart.
            let mut dedup = self.services.dedup.lock().await;
            let dedup_outcome = dedup.process(Candidate {
                title: hit.title.clone(),
                description: hit.description.clone(),
                score,
            });
            drop(dedup);

            let content_hash = match dedup_outcome {
                DedupOutcome::New { content_hash } => content_hash,
                DedupOutcome::Duplicate { existing_hash, .. } => existing_hash,
            };

            let url_valid =
                url::Url::parse(&hit.url).map(|u| u.scheme() == "http" || u.scheme() == "https").unwrap_or(false);

            let saved = ResultQueries::upsert_by_content_hash(
                &self.db,
                item.failure_id,
                hit.title.clone(),
                hit.description.clone(),
                hit.url.clone(),
                hit.provider.clone(),
                None,
                item.language.clone(),
                Some(query_text.clone()),
                score,
                hit.provider.clone(),
                content_hash,
                url_valid,
            )
            .await?;

            if item.language != "pt" {
                let title_pt = self.services.translate_validated(&hit.title, &item.language, "pt").await;
                let description_pt =
                    self.services.translate_validated(&hit.description, &item.language, "pt").await;
                if title_pt.is_some() || description_pt.is_some() {
                    ResultQueries::update_translation(&self.db, saved.id, title_pt, description_pt, None, None)
                        .await?;
                }
            }

            if self.vector_store_enabled {
                if let Some(store) = &self.vector_store {
                    let record: ResultRecord = saved.clone().into();
                    let vector = self.services.embeddings.embed(record.scoring_title()).await.unwrap_or_default();
                    if !vector.is_empty() {
                        let mut metadata = HashMap::new();
                        metadata.insert("failure_id".to_string(), Value::from(item.failure_id));
                        store.add(
                            VectorCollectionKind::Results,
                            vec![record.id.to_string()],
                            vec![vector],
                            vec![metadata],
                            vec![Some(record.scoring_title().to_string())],
                        );
                    }
                }
            }

            let _ = self.rag_enabled;
            persisted += 1;
        }

        Ok(persisted)
    }
}

/// Look up a Failure for diagnostics/logging; not on the hot path.
pub async fn failure_title(db: &DatabaseConnection, failure_id: i64) -> Option<String> {
    FailureQueries::find_by_id(db, failure_id).await.ok().flatten().map(|f| f.title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use research_core::services::{EmbeddingBackend, Translator};
    use research_db::run_migrations;
    use research_providers::mock::MockSearchProvider;
    use sea_orm::Database;

    struct NoopTranslator;

    #[async_trait]
    impl Translator for NoopTranslator {
        async fn translate(&self, _text: &str, _source: &str, _target: &str) -> Option<String> {
            None
        }

        async fn detect_and_translate(
            &self,
            _text: &str,
            _assumed_source: &str,
            _target: &str,
        ) -> Option<(String, String)> {
            None
        }
    }

    struct ZeroEmbeddings;

    #[async_trait]
    impl EmbeddingBackend for ZeroEmbeddings {
        async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            Ok(vec![0.0; 4])
        }
    }

    async fn test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        run_migrations(&db).await.unwrap();
        db
    }

    fn hit(title: &str) -> research_core::models::SearchHit {
        research_core::models::SearchHit {
            title: title.to_string(),
            description: "affordable credit lines for early-stage startups".to_string(),
            url: "https://example.org/credit-lines".to_string(),
            published_at: None,
            provider: "perplexity".to_string(),
        }
    }

    fn test_pool(db: DatabaseConnection, providers: Vec<Arc<dyn SearchProvider>>) -> WorkerPool {
        let services = Arc::new(Services::new(Arc::new(NoopTranslator), Arc::new(ZeroEmbeddings), 0.8));
        let config = PoolConfig {
            worker_count: 2,
            min_calls: 1,
            max_calls: 3,
            min_quality: 0.0,
            adaptive_enabled: false,
            inter_call_delay: Duration::from_millis(0),
            max_requests_per_minute: 1000,
            stuck_after: ChronoDuration::seconds(600),
            vector_store_enabled: false,
            rag_enabled: false,
            max_results_per_call: 10,
        };
        WorkerPool::new(db, providers, services, None, config)
    }

    #[tokio::test]
    async fn process_batch_persists_a_result_and_marks_item_done() {
        let db = test_db().await;
        let failure = FailureQueries::seed(
            &db,
            "Lack of credit".to_string(),
            "finance".to_string(),
            "Startups can't access affordable credit lines".to_string(),
            Some("credit access".to_string()),
        )
        .await
        .unwrap();

        QueueQueries::enqueue(
            &db,
            failure.id,
            "startup credit access".to_string(),
            "en".to_string(),
            "perplexity".to_string(),
            0,
            3,
        )
        .await
        .unwrap();

        let provider: Arc<dyn SearchProvider> =
            Arc::new(MockSearchProvider::new("perplexity").with_hits(vec![hit("Startup credit access guide")]));
        let pool = test_pool(db.clone(), vec![provider]);

        let stats = pool.process_batch(10).await;
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.errors, 0);

        let pending = QueueQueries::count_pending(&db).await.unwrap();
        assert_eq!(pending, 0);

        let results = ResultQueries::find_by_failure(&db, failure.id, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].occurrences, 1);
    }

    #[tokio::test]
    async fn invalid_item_goes_to_error_without_calling_any_provider() {
        let db = test_db().await;
        let failure = FailureQueries::seed(
            &db,
            "Lack of credit".to_string(),
            "finance".to_string(),
            "desc".to_string(),
            None,
        )
        .await
        .unwrap();

        // Empty query_text fails QueueItem::validate().
        QueueQueries::enqueue(&db, failure.id, "".to_string(), "en".to_string(), "perplexity".to_string(), 0, 3)
            .await
            .unwrap();

        let provider: Arc<dyn SearchProvider> = Arc::new(MockSearchProvider::new("perplexity"));
        let pool = test_pool(db.clone(), vec![provider]);

        let stats = pool.process_batch(10).await;
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.processed, 0);

        let history = HistoryQueries::find_by_failure(&db, failure.id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, "error");
    }

    #[tokio::test]
    async fn process_parallel_drains_multiple_items_concurrently() {
        let db = test_db().await;
        let failure = FailureQueries::seed(
            &db,
            "Lack of credit".to_string(),
            "finance".to_string(),
            "desc".to_string(),
            Some("credit".to_string()),
        )
        .await
        .unwrap();

        for i in 0..4 {
            QueueQueries::enqueue(
                &db,
                failure.id,
                format!("query {i}"),
                "en".to_string(),
                "perplexity".to_string(),
                0,
                3,
            )
            .await
            .unwrap();
        }

        let provider: Arc<dyn SearchProvider> =
            Arc::new(MockSearchProvider::new("perplexity").with_hits(vec![hit("Startup credit access guide")]));
        let pool = test_pool(db.clone(), vec![provider]);

        let stats = pool.process_parallel().await;
        assert_eq!(stats.processed, 4);

        let pending = QueueQueries::count_pending(&db).await.unwrap();
        assert_eq!(pending, 0);
    }
}
