use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};

use crate::entities::failure::{ActiveModel, Entity, Model};

pub struct FailureQueries;

impl FailureQueries {
    pub async fn find_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Model>, DbErr> {
        Entity::find().all(db).await
    }

    /// Seed a failure record (§3: failures are normally created out-of-band;
    /// this exists for test fixtures and local bootstrapping).
    pub async fn seed(
        db: &DatabaseConnection,
        title: String,
        pillar: String,
        description: String,
        search_hint: Option<String>,
    ) -> Result<Model, DbErr> {
        let active = ActiveModel {
            id: Default::default(),
            title: Set(title),
            pillar: Set(pillar),
            description: Set(description),
            search_hint: Set(search_hint),
        };
        active.insert(db).await
    }
}
