use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use research_core::config::Settings;
use research_core::services::Services;
use research_db::queries::ReportQueries;
use research_providers::ProviderFactory;
use research_translate::{GatewayConfig, LlmTranslationService};
use research_vector::{EmbeddingService, VectorStore};
use research_worker::pool::{PoolConfig, WorkerPool};
use research_worker::populate::populate_queue_default;

#[derive(Parser)]
#[command(name = "research-worker", about = "Adaptive multilingual research orchestrator worker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand every Failure into queue items (§4.8).
    PopulateQueue,
    /// Delete every queue item.
    ClearQueue,
    /// Claim and process up to N pending items, then exit.
    ProcessBatch {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Run every configured worker slot concurrently and independently
    /// until the queue has nothing left to claim.
    ProcessParallel,
    /// Process items with the configured worker pool until none remain.
    ProcessUntilEmpty,
    /// Run `process-until-empty` repeatedly, with a stuck-item recovery
    /// pass between rounds, until interrupted.
    Loop {
        #[arg(long, default_value_t = 30)]
        idle_sleep_secs: u64,
    },
    /// Scan stored results for language/content mismatches (§11.2).
    LanguageReport,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,research=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let db = research_db::init_database(&settings.database_url).await?;
    research_db::run_migrations(&db).await?;

    match cli.command {
        Commands::PopulateQueue => {
            let translator = LlmTranslationService::from_config(GatewayConfig::from_env()?)?;
            let stats = populate_queue_default(&db, &translator, &settings).await?;
            tracing::info!(
                failures_processed = stats.failures_processed,
                items_enqueued = stats.items_enqueued,
                "queue populated"
            );
        }
        Commands::ClearQueue => {
            let removed = research_db::queries::QueueQueries::clear_all(&db).await?;
            tracing::info!(removed, "queue cleared");
        }
        Commands::ProcessBatch { limit } => {
            let pool = build_pool(&settings, db).await?;
            let stats = pool.process_batch(limit).await;
            tracing::info!(processed = stats.processed, errors = stats.errors, "batch complete");
        }
        Commands::ProcessParallel => {
            let pool = build_pool(&settings, db).await?;
            let stats = pool.process_parallel().await;
            tracing::info!(processed = stats.processed, errors = stats.errors, "parallel run complete");
        }
        Commands::ProcessUntilEmpty => {
            let pool = build_pool(&settings, db).await?;
            let stats = pool.process_until_empty().await;
            tracing::info!(processed = stats.processed, errors = stats.errors, "queue drained");
        }
        Commands::Loop { idle_sleep_secs } => {
            let pool = build_pool(&settings, db).await?;
            loop {
                let recovered = pool.recover_stuck().await?;
                if recovered > 0 {
                    tracing::warn!(recovered, "recovered stuck items");
                }
                let stats = pool.process_until_empty().await;
                tracing::info!(processed = stats.processed, errors = stats.errors, "round complete");
                tokio::time::sleep(Duration::from_secs(idle_sleep_secs)).await;
            }
        }
        Commands::LanguageReport => {
            let report = ReportQueries::language_diagnostic(&db).await?;
            tracing::info!(
                total = report.total,
                problematic = report.problematic_count,
                problematic_percent = report.problematic_percent,
                "language diagnostic complete"
            );
            for example in &report.example_problems {
                tracing::warn!(
                    result_id = example.result_id,
                    expected = %example.expected_language,
                    detected = %example.detected_language,
                    confidence = example.confidence,
                    "language mismatch"
                );
            }
        }
    }

    Ok(())
}

async fn build_pool(settings: &Settings, db: sea_orm::DatabaseConnection) -> Result<WorkerPool> {
    let providers = ProviderFactory::new(settings).create_all();

    let translator: Arc<dyn research_core::services::Translator> =
        Arc::new(LlmTranslationService::from_config(GatewayConfig::from_env()?)?);
    let embeddings: Arc<dyn research_core::services::EmbeddingBackend> =
        Arc::new(EmbeddingService::from_settings(settings));
    let services = Arc::new(Services::new(translator, embeddings, settings.dedup_jaccard_threshold));

    let vector_store =
        if settings.vector_store_enabled { Some(Arc::new(VectorStore::new())) } else { None };

    let config = PoolConfig {
        worker_count: settings.max_workers,
        min_calls: settings.min_calls_per_query as usize,
        max_calls: settings.max_calls_per_query as usize,
        min_quality: settings.min_quality_to_stop,
        adaptive_enabled: settings.adaptive_search_enabled,
        inter_call_delay: Duration::from_secs_f64(settings.min_inter_call_delay_secs),
        max_requests_per_minute: settings.max_requests_per_minute,
        stuck_after: chrono::Duration::seconds(settings.stuck_item_timeout_secs as i64),
        vector_store_enabled: settings.vector_store_enabled,
        rag_enabled: settings.rag_enabled,
        max_results_per_call: 10,
    };

    Ok(WorkerPool::new(db, providers, services, vector_store, config))
}
