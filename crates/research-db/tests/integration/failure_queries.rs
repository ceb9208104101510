use research_db::queries::FailureQueries;

use super::common::TestDb;

#[tokio::test]
async fn seed_and_find_round_trip() {
    let db = TestDb::new().await.unwrap();
    db.run_migrations().await.unwrap();

    let failure = FailureQueries::seed(
        db.connection(),
        "Limited access to credit".to_string(),
        "financial_inclusion".to_string(),
        "Smallholder farmers lack affordable credit lines".to_string(),
        Some("microcredit smallholder farmers".to_string()),
    )
    .await
    .unwrap();

    let found = FailureQueries::find_by_id(db.connection(), failure.id).await.unwrap();
    assert!(found.is_some());
    assert_eq!(found.unwrap().title, "Limited access to credit");
}

#[tokio::test]
async fn list_all_returns_every_seeded_failure() {
    let db = TestDb::new().await.unwrap();
    db.run_migrations().await.unwrap();

    for i in 0..3 {
        FailureQueries::seed(
            db.connection(),
            format!("Failure {i}"),
            "pillar".to_string(),
            "description".to_string(),
            None,
        )
        .await
        .unwrap();
    }

    let all = FailureQueries::list_all(db.connection()).await.unwrap();
    assert_eq!(all.len(), 3);
}
