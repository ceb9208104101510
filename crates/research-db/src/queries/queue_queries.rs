use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::queue_item::{ActiveModel, Column, Entity, Model};

pub struct QueueQueries;

impl QueueQueries {
    pub async fn enqueue(
        db: &DatabaseConnection,
        failure_id: i64,
        query_text: String,
        language: String,
        provider: String,
        priority: i32,
        max_attempts: i32,
    ) -> Result<Model, DbErr> {
        let active = ActiveModel {
            id: Default::default(),
            failure_id: Set(failure_id),
            query_text: Set(query_text),
            language: Set(language),
            provider: Set(provider),
            priority: Set(priority),
            attempts: Set(0),
            max_attempts: Set(max_attempts),
            status: Set("pending".to_string()),
            created_at: Set(Utc::now()),
            claimed_at: Set(None),
        };
        active.insert(db).await
    }

    /// Claim the highest-priority pending item (§4.8: fair, priority-ordered
    /// dequeue). Marks it `in_progress` and stamps `claimed_at` inside the
    /// same transaction so no two workers can claim the same row.
    pub async fn claim_next(db: &DatabaseConnection) -> Result<Option<Model>, DbErr> {
        let txn = db.begin().await?;

        let candidate = Entity::find()
            .filter(Column::Status.eq("pending"))
            .order_by_desc(Column::Priority)
            .order_by_asc(Column::CreatedAt)
            .one(&txn)
            .await?;

        let Some(item) = candidate else {
            txn.commit().await?;
            return Ok(None);
        };

        let next_attempts = item.attempts + 1;
        let mut active: ActiveModel = item.into();
        active.status = Set("in_progress".to_string());
        active.claimed_at = Set(Some(Utc::now()));
        active.attempts = Set(next_attempts);
        let claimed = active.update(&txn).await?;

        txn.commit().await?;
        Ok(Some(claimed))
    }

    pub async fn mark_done(db: &DatabaseConnection, id: i64) -> Result<(), DbErr> {
        let Some(item) = Entity::find_by_id(id).one(db).await? else {
            return Ok(());
        };
        let mut active: ActiveModel = item.into();
        active.status = Set("done".to_string());
        active.update(db).await?;
        Ok(())
    }

    /// Invalid items go straight to `error`, no retry (§4.10, §7 "Invalid
    /// item" policy) — unlike [`Self::mark_failed`], which still honors
    /// `max_attempts`.
    pub async fn mark_invalid(db: &DatabaseConnection, id: i64) -> Result<(), DbErr> {
        let Some(item) = Entity::find_by_id(id).one(db).await? else {
            return Ok(());
        };
        let mut active: ActiveModel = item.into();
        active.status = Set("error".to_string());
        active.claimed_at = Set(None);
        active.update(db).await?;
        Ok(())
    }

    /// Mark an item `error`; terminal only once `attempts >= max_attempts`,
    /// otherwise it goes back to `pending` for another try (§3 lifecycle).
    pub async fn mark_failed(db: &DatabaseConnection, id: i64) -> Result<(), DbErr> {
        let Some(item) = Entity::find_by_id(id).one(db).await? else {
            return Ok(());
        };
        let retryable = item.attempts < item.max_attempts;
        let mut active: ActiveModel = item.into();
        active.status = Set(if retryable { "pending".to_string() } else { "error".to_string() });
        active.claimed_at = Set(None);
        active.update(db).await?;
        Ok(())
    }

    /// Recover `in_progress` items whose claim is older than `stuck_after`
    /// back to `pending` (§4.10 stuck-item recovery). Returns how many rows
    /// were recovered.
    pub async fn recover_stuck(db: &DatabaseConnection, stuck_after: Duration) -> Result<u64, DbErr> {
        let cutoff: DateTime<Utc> = Utc::now() - stuck_after;

        let stuck = Entity::find()
            .filter(Column::Status.eq("in_progress"))
            .filter(Column::ClaimedAt.lt(cutoff))
            .all(db)
            .await?;

        let count = stuck.len() as u64;
        for item in stuck {
            let mut active: ActiveModel = item.into();
            active.status = Set("pending".to_string());
            active.claimed_at = Set(None);
            active.update(db).await?;
        }
        Ok(count)
    }

    pub async fn count_pending(db: &DatabaseConnection) -> Result<u64, DbErr> {
        Entity::find().filter(Column::Status.eq("pending")).count(db).await
    }

    pub async fn clear_all(db: &DatabaseConnection) -> Result<u64, DbErr> {
        let res = Entity::delete_many().exec(db).await?;
        Ok(res.rows_affected)
    }

    pub async fn find_by_failure(
        db: &DatabaseConnection,
        failure_id: i64,
        limit: u64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::FailureId.eq(failure_id))
            .order_by_desc(Column::CreatedAt)
            .limit(limit)
            .all(db)
            .await
    }
}
