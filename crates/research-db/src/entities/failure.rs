use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Read-mostly: failures are created out-of-band by the prioritization
/// surface this crate does not implement (§3). The pipeline only selects
/// from this table; it never inserts through the normal request path.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "failures")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub pillar: String,
    pub description: String,
    pub search_hint: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::queue_item::Entity")]
    QueueItems,
    #[sea_orm(has_many = "super::result::Entity")]
    Results,
    #[sea_orm(has_many = "super::history::Entity")]
    History,
}

impl Related<super::queue_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QueueItems.def()
    }
}

impl Related<super::result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Results.def()
    }
}

impl Related<super::history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for research_core::models::Failure {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            pillar: model.pillar,
            description: model.description,
            search_hint: model.search_hint,
        }
    }
}
