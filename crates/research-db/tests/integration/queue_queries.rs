use chrono::Duration;
use research_db::queries::{FailureQueries, QueueQueries};

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
async fn claim_next_prefers_higher_priority() {
    let db = TestDb::new().await.unwrap();
    db.run_migrations().await.unwrap();
    let failure_id = seed_failure(db.connection()).await;

    QueueQueries::enqueue(db.connection(), failure_id, "q1".to_string(), "en".to_string(), "perplexity".to_string(), 0, 3)
        .await
        .unwrap();
    QueueQueries::enqueue(db.connection(), failure_id, "q2".to_string(), "en".to_string(), "tavily".to_string(), 5, 3)
        .await
        .unwrap();

    let claimed = QueueQueries::claim_next(db.connection()).await.unwrap().unwrap();
    assert_eq!(claimed.query_text, "q2");
    assert_eq!(claimed.status, "in_progress");
    assert_eq!(claimed.attempts, 1);
}

#[tokio::test]
async fn claim_next_returns_none_when_empty() {
    let db = TestDb::new().await.unwrap();
    db.run_migrations().await.unwrap();

    let claimed = QueueQueries::claim_next(db.connection()).await.unwrap();
    assert!(claimed.is_none());
}

#[tokio::test]
async fn mark_failed_retries_until_max_attempts() {
    let db = TestDb::new().await.unwrap();
    db.run_migrations().await.unwrap();
    let failure_id = seed_failure(db.connection()).await;

    let item = QueueQueries::enqueue(
        db.connection(),
        failure_id,
        "q".to_string(),
        "en".to_string(),
        "jina".to_string(),
        0,
        2,
    )
    .await
    .unwrap();

    QueueQueries::claim_next(db.connection()).await.unwrap();
    QueueQueries::mark_failed(db.connection(), item.id).await.unwrap();

    let pending = QueueQueries::count_pending(db.connection()).await.unwrap();
    assert_eq!(pending, 1, "first failure should retry, not go terminal");

    QueueQueries::claim_next(db.connection()).await.unwrap();
    QueueQueries::mark_failed(db.connection(), item.id).await.unwrap();

    let pending = QueueQueries::count_pending(db.connection()).await.unwrap();
    assert_eq!(pending, 0, "second failure hits max_attempts and goes terminal");
}

#[tokio::test]
async fn recover_stuck_returns_items_to_pending() {
    let db = TestDb::new().await.unwrap();
    db.run_migrations().await.unwrap();
    let failure_id = seed_failure(db.connection()).await;

    QueueQueries::enqueue(db.connection(), failure_id, "q".to_string(), "en".to_string(), "jina".to_string(), 0, 3)
        .await
        .unwrap();
    QueueQueries::claim_next(db.connection()).await.unwrap();

    // Not yet stuck under a generous timeout.
    let recovered = QueueQueries::recover_stuck(db.connection(), Duration::hours(1)).await.unwrap();
    assert_eq!(recovered, 0);

    // Immediately stuck under a zero timeout.
    let recovered = QueueQueries::recover_stuck(db.connection(), Duration::seconds(-1)).await.unwrap();
    assert_eq!(recovered, 1);

    let pending = QueueQueries::count_pending(db.connection()).await.unwrap();
    assert_eq!(pending, 1);
}

#[tokio::test]
async fn clear_all_empties_the_queue() {
    let db = TestDb::new().await.unwrap();
    db.run_migrations().await.unwrap();
    let failure_id = seed_failure(db.connection()).await;

    QueueQueries::enqueue(db.connection(), failure_id, "q".to_string(), "en".to_string(), "jina".to_string(), 0, 3)
        .await
        .unwrap();

    let cleared = QueueQueries::clear_all(db.connection()).await.unwrap();
    assert_eq!(cleared, 1);
    assert_eq!(QueueQueries::count_pending(db.connection()).await.unwrap(), 0);
}
