//! Queue populate (C8, SPEC_FULL §4.8).
//!
//! Expands every Failure into multilingual query variants, then assigns
//! each a provider by round-robin over a single counter shared across the
//! whole run — not reset per failure — so that providers end up evenly
//! loaded across the batch rather than each failure favoring provider #1.

use research_core::config::Settings;
use research_core::models::ProviderKind;
use research_core::query_gen::{generate_multilingual_queries, QueryTranslator};
use research_db::queries::{FailureQueries, QueueQueries};
use sea_orm::{DatabaseConnection, DbErr};

const SOURCE_LANGUAGE: &str = "pt";
const DEFAULT_PRIORITY: i32 = 0;

#[derive(Debug, Default, Clone, Copy)]
pub struct PopulateStats {
    pub failures_processed: usize,
    pub items_enqueued: usize,
}

/// Populate the queue from every known Failure. `providers` is the pool to
/// round-robin over (normally [`ProviderKind::DEFAULT_ENABLED`]); `limit`
/// caps the total number of items enqueued, honoring §6's test-mode cap.
pub async fn populate_queue(
    db: &DatabaseConnection,
    translator: &dyn QueryTranslator,
    settings: &Settings,
    providers: &[ProviderKind],
) -> Result<PopulateStats, DbErr> {
    let limit = if settings.test_mode_enabled { settings.test_mode_limit } else { None };

    let failures = FailureQueries::list_all(db).await?;
    let mut stats = PopulateStats::default();
    let mut provider_counter: usize = 0;

    'failures: for failure in &failures {
        let variants = generate_multilingual_queries(
            failure,
            &settings.languages,
            SOURCE_LANGUAGE,
            translator,
        )
        .await;

        for variant in variants.into_iter().take(settings.queries_per_failure) {
            if let Some(limit) = limit {
                if stats.items_enqueued >= limit {
                    break 'failures;
                }
            }

            let provider = providers[provider_counter % providers.len()];
            provider_counter += 1;

            QueueQueries::enqueue(
                db,
                failure.id,
                variant.text,
                variant.language,
                provider.as_str().to_string(),
                DEFAULT_PRIORITY,
                settings.max_retries as i32,
            )
            .await?;

            stats.items_enqueued += 1;
        }

        stats.failures_processed += 1;
    }

    Ok(stats)
}

/// Convenience wrapper taking the operator-enabled subset of
/// [`ProviderKind::DEFAULT_ENABLED`] (`settings.providers_enabled`), so a
/// provider the operator disabled via `PROVIDER_<NAME>_ENABLED=false` is
/// never assigned to a freshly populated queue item.
pub async fn populate_queue_default(
    db: &DatabaseConnection,
    translator: &dyn QueryTranslator,
    settings: &Settings,
) -> Result<PopulateStats, DbErr> {
    let providers: Vec<ProviderKind> = ProviderKind::DEFAULT_ENABLED
        .into_iter()
        .filter(|p| *settings.providers_enabled.get(p.as_str()).unwrap_or(&true))
        .collect();

    if providers.is_empty() {
        return Ok(PopulateStats::default());
    }

    populate_queue(db, translator, settings, &providers).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use research_db::run_migrations;
    use sea_orm::Database;

    struct IdentityTranslator;

    #[async_trait]
    impl QueryTranslator for IdentityTranslator {
        async fn translate(&self, text: &str, _source: &str, target: &str) -> Option<String> {
            Some(format!("[{target}] {text}"))
        }
    }

    async fn test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        run_migrations(&db).await.unwrap();
        db
    }

    fn settings() -> Settings {
        let mut s = minimal_settings();
        s.languages = vec!["pt".to_string(), "en".to_string()];
        s.queries_per_failure = 2;
        s
    }

    fn minimal_settings() -> Settings {
        // Settings::from_env() requires real env vars; build directly for
        // tests instead.
        Settings {
            database_url: "sqlite::memory:".to_string(),
            jina_api_key: "x".to_string(),
            perplexity_api_key: "x".to_string(),
            tavily_api_key: None,
            serper_api_key: None,
            exa_api_key: None,
            openrouter_api_key: None,
            openai_api_key: None,
            languages: vec!["pt".to_string()],
            providers_enabled: Default::default(),
            min_calls_per_query: 2,
            max_calls_per_query: 8,
            min_quality_to_stop: 0.75,
            adaptive_search_enabled: true,
            max_workers: 1,
            min_inter_call_delay_secs: 0.0,
            max_requests_per_minute: 60,
            max_retries: 3,
            http_timeout_secs: 60,
            stuck_item_timeout_secs: 600,
            rag_enabled: false,
            rag_similarity_threshold: 0.7,
            rag_dedup_threshold: 0.85,
            embedding_dim: 8,
            embedding_model: "test".to_string(),
            vector_store_enabled: false,
            dedup_jaccard_threshold: 0.8,
            translation_models_free: vec![],
            translation_models_premium: vec![],
            min_confidence_threshold: 0.3,
            queries_per_failure: 5,
            test_mode_enabled: false,
            test_mode_limit: None,
        }
    }

    #[tokio::test]
    async fn round_robins_providers_across_failures() {
        let db = test_db().await;
        FailureQueries::seed(
            &db,
            "Lack of credit".to_string(),
            "finance".to_string(),
            "Startups can't access affordable credit lines".to_string(),
            Some("credit access".to_string()),
        )
        .await
        .unwrap();
        FailureQueries::seed(
            &db,
            "Talent shortage".to_string(),
            "people".to_string(),
            "Hard to hire engineers".to_string(),
            Some("engineering hiring".to_string()),
        )
        .await
        .unwrap();

        let providers = [ProviderKind::Perplexity, ProviderKind::Jina];
        let stats =
            populate_queue(&db, &IdentityTranslator, &settings(), &providers).await.unwrap();

        assert_eq!(stats.failures_processed, 2);
        assert!(stats.items_enqueued > 0);

        let pending = QueueQueries::count_pending(&db).await.unwrap();
        assert_eq!(pending as usize, stats.items_enqueued);
    }

    #[tokio::test]
    async fn test_mode_limit_caps_enqueued_items() {
        let db = test_db().await;
        FailureQueries::seed(
            &db,
            "Lack of credit".to_string(),
            "finance".to_string(),
            "Startups can't access affordable credit lines".to_string(),
            Some("credit access".to_string()),
        )
        .await
        .unwrap();

        let mut s = settings();
        s.test_mode_enabled = true;
        s.test_mode_limit = Some(1);

        let providers = [ProviderKind::Perplexity];
        let stats = populate_queue(&db, &IdentityTranslator, &s, &providers).await.unwrap();

        assert_eq!(stats.items_enqueued, 1);
    }

    #[tokio::test]
    async fn default_populate_excludes_operator_disabled_providers() {
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

        let mut s = settings();
        s.providers_enabled.insert("perplexity".to_string(), false);
        s.providers_enabled.insert("jina".to_string(), false);
        s.providers_enabled.insert("tavily".to_string(), false);
        s.providers_enabled.insert("serper".to_string(), false);
        s.providers_enabled.insert("exa".to_string(), true);

        let stats = populate_queue_default(&db, &IdentityTranslator, &s).await.unwrap();

        assert!(stats.items_enqueued > 0);
        let enqueued =
            QueueQueries::find_by_failure(&db, failure.id, stats.items_enqueued as u64)
                .await
                .unwrap();
        assert!(enqueued.iter().all(|item| item.provider == "exa"));
    }
}
