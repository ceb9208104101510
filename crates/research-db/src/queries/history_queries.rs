use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

use crate::entities::history::{ActiveModel, Column, Entity, Model};

pub struct HistoryQueries;

impl HistoryQueries {
    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        db: &DatabaseConnection,
        failure_id: i64,
        query: String,
        language: String,
        provider: String,
        status: String,
        results_found: i32,
        error_message: Option<String>,
        elapsed_seconds: Option<f64>,
    ) -> Result<Model, DbErr> {
        let active = ActiveModel {
            id: Default::default(),
            failure_id: Set(failure_id),
            query: Set(query),
            language: Set(language),
            provider: Set(provider),
            status: Set(status),
            results_found: Set(results_found),
            error_message: Set(error_message),
            elapsed_seconds: Set(elapsed_seconds),
            executed_at: Set(Utc::now()),
        };
        active.insert(db).await
    }

    pub async fn find_by_failure(
        db: &DatabaseConnection,
        failure_id: i64,
        limit: u64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::FailureId.eq(failure_id))
            .order_by_desc(Column::ExecutedAt)
            .limit(limit)
            .all(db)
            .await
    }
}
