use research_db::queries::{FailureQueries, HistoryQueries};

use super::common::TestDb;

#[tokio::test]
async fn record_and_find_by_failure() {
    let db = TestDb::new().await.unwrap();
    db.run_migrations().await.unwrap();

    let failure = FailureQueries::seed(
        db.connection(),
        "Failure".to_string(),
        "pillar".to_string(),
        "description".to_string(),
        None,
    )
    .await
    .unwrap();

    HistoryQueries::record(
        db.connection(),
        failure.id,
        "credit access".to_string(),
        "en".to_string(),
        "perplexity".to_string(),
        "ok".to_string(),
        3,
        None,
        Some(1.25),
    )
    .await
    .unwrap();

    HistoryQueries::record(
        db.connection(),
        failure.id,
        "credit access".to_string(),
        "en".to_string(),
        "tavily".to_string(),
        "rate_limited".to_string(),
        0,
        Some("429".to_string()),
        None,
    )
    .await
    .unwrap();

    let entries = HistoryQueries::find_by_failure(db.connection(), failure.id, 10).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().any(|e| e.provider == "perplexity" && e.results_found == 3));
    assert!(entries.iter().any(|e| e.error_message.as_deref() == Some("429")));
}
