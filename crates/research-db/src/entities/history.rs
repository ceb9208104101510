use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit row, one per provider call the Worker makes (§11.1).
/// Written regardless of whether the call produced a persisted
/// [`super::result::Model`], and never mutated afterward.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "history_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub failure_id: i64,
    pub query: String,
    pub language: String,
    pub provider: String,
    pub status: String,
    pub results_found: i32,
    pub error_message: Option<String>,
    pub elapsed_seconds: Option<f64>,
    pub executed_at: DateTimeUtc,
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

impl From<Model> for research_core::models::HistoryEntry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            failure_id: model.failure_id,
            query: model.query,
            language: model.language,
            provider: model.provider,
            status: model.status,
            results_found: model.results_found,
            error_message: model.error_message,
            elapsed_seconds: model.elapsed_seconds,
            executed_at: model.executed_at,
        }
    }
}
