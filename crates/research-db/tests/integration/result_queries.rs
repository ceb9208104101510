use research_db::queries::{FailureQueries, ResultQueries};

use super::common::TestDb;

async fn seed_failure(db: &sea_orm::DatabaseConnection) -> i64 {
    FailureQueries::seed(
        db,
        "Failure".to_string(),
        "pillar".to_string(),
        "description".to_string(),
        None,
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn upsert_by_content_hash_inserts_then_merges() {
    let db = TestDb::new().await.unwrap();
    db.run_migrations().await.unwrap();
    let failure_id = seed_failure(db.connection()).await;

    let first = ResultQueries::upsert_by_content_hash(
        db.connection(),
        failure_id,
        "Title".to_string(),
        "Description".to_string(),
        "https://example.org/article".to_string(),
        "perplexity".to_string(),
        None,
        "en".to_string(),
        Some("credit access".to_string()),
        0.6,
        "perplexity".to_string(),
        "hash-123".to_string(),
        true,
    )
    .await
    .unwrap();
    assert_eq!(first.occurrences, 1);

    let second = ResultQueries::upsert_by_content_hash(
        db.connection(),
        failure_id,
        "Title".to_string(),
        "Description".to_string(),
        "https://example.org/article".to_string(),
        "tavily".to_string(),
        None,
        "en".to_string(),
        Some("credit access".to_string()),
        0.7,
        "tavily".to_string(),
        "hash-123".to_string(),
        true,
    )
    .await
    .unwrap();

    assert_eq!(second.id, first.id, "same content_hash must merge into the same row");
    assert_eq!(second.occurrences, 2);
    // base_score (0.7) plus one occurrence's worth of boost, recomputed from
    // the row's persisted occurrences rather than trusted verbatim.
    assert!((second.confidence_score - 0.75).abs() < 1e-9);
}

#[tokio::test]
async fn update_translation_sets_pt_fields() {
    let db = TestDb::new().await.unwrap();
    db.run_migrations().await.unwrap();
    let failure_id = seed_failure(db.connection()).await;

    let result = ResultQueries::upsert_by_content_hash(
        db.connection(),
        failure_id,
        "Title".to_string(),
        "Description".to_string(),
        "https://example.org/article".to_string(),
        "perplexity".to_string(),
        None,
        "en".to_string(),
        None,
        0.5,
        "perplexity".to_string(),
        "hash-456".to_string(),
        true,
    )
    .await
    .unwrap();

    let updated = ResultQueries::update_translation(
        db.connection(),
        result.id,
        Some("Titulo".to_string()),
        Some("Descricao".to_string()),
        None,
        None,
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.title_pt.as_deref(), Some("Titulo"));
    assert_eq!(updated.description_pt.as_deref(), Some("Descricao"));
}

#[tokio::test]
async fn top_by_failure_orders_by_confidence_descending() {
    let db = TestDb::new().await.unwrap();
    db.run_migrations().await.unwrap();
    let failure_id = seed_failure(db.connection()).await;

    for (hash, score) in [("a", 0.3), ("b", 0.9), ("c", 0.6)] {
        ResultQueries::upsert_by_content_hash(
            db.connection(),
            failure_id,
            "Title".to_string(),
            "Description".to_string(),
            format!("https://example.org/{hash}"),
            "perplexity".to_string(),
            None,
            "en".to_string(),
            None,
            score,
            "perplexity".to_string(),
            hash.to_string(),
            true,
        )
        .await
        .unwrap();
    }

    let top = ResultQueries::top_by_failure(db.connection(), failure_id, 2).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].content_hash, "b");
    assert_eq!(top[1].content_hash, "c");
}
