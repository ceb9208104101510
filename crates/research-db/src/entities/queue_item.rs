use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One unit of work for C10: a (failure, query variant, language, provider)
/// tuple with a lifecycle status (§3, §4.8).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "queue_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub failure_id: i64,
    pub query_text: String,
    pub language: String,
    pub provider: String,
    pub priority: i32,
    pub attempts: i32,
    pub max_attempts: i32,
    pub status: String, // pending | in_progress | done | error
    pub created_at: DateTimeUtc,
    pub claimed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::failure::Entity",
        from = "Column::FailureId",
        to = "super::failure::Column::Id"
    )]
    Failure,
}

impl Related<super::failure::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Failure.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for research_core::models::QueueItem {
    fn from(model: Model) -> Self {
        let status = match model.status.as_str() {
            "pending" => research_core::models::QueueStatus::Pending,
            "in_progress" => research_core::models::QueueStatus::InProgress,
            "done" => research_core::models::QueueStatus::Done,
            "error" => research_core::models::QueueStatus::Error,
            _ => research_core::models::QueueStatus::Pending,
        };

        Self {
            id: model.id,
            failure_id: model.failure_id,
            query_text: model.query_text,
            language: model.language,
            provider: model.provider,
            priority: model.priority,
            attempts: model.attempts,
            max_attempts: model.max_attempts,
            status,
            created_at: model.created_at,
        }
    }
}
