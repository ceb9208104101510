use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A persisted, scored, deduplicated research hit (§3). `content_hash` is
/// unique; re-scoring/re-translation jobs update rows in place and never
/// delete (§3 ownership notes).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub failure_id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub provider_type: String,
    pub country: Option<String>,
    pub language: String,
    pub query: Option<String>,
    pub confidence_score: f64,
    pub occurrences: i32,
    pub origin_provider: String,
    #[sea_orm(unique)]
    pub content_hash: String,
    pub url_valid: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub title_pt: Option<String>,
    pub description_pt: Option<String>,
    pub title_en: Option<String>,
    pub description_en: Option<String>,
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

impl From<Model> for research_core::models::ResultRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            failure_id: model.failure_id,
            title: model.title,
            description: model.description,
            url: model.url,
            provider_type: model.provider_type,
            country: model.country,
            language: model.language,
            query: model.query,
            confidence_score: model.confidence_score,
            occurrences: model.occurrences,
            origin_provider: model.origin_provider,
            content_hash: model.content_hash,
            url_valid: model.url_valid,
            created_at: model.created_at,
            updated_at: model.updated_at,
            title_pt: model.title_pt,
            description_pt: model.description_pt,
            title_en: model.title_en,
            description_en: model.description_en,
        }
    }
}
