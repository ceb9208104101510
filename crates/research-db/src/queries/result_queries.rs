use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use research_core::dedup::boost_for_occurrences;

use crate::entities::result::{ActiveModel, Column, Entity, Model};

pub struct ResultQueries;

impl ResultQueries {
    pub async fn find_by_content_hash(
        db: &DatabaseConnection,
        content_hash: &str,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find().filter(Column::ContentHash.eq(content_hash)).one(db).await
    }

    pub async fn find_by_failure(
        db: &DatabaseConnection,
        failure_id: i64,
        limit: u64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::FailureId.eq(failure_id))
            .order_by_desc(Column::ConfidenceScore)
            .limit(limit)
            .all(db)
            .await
    }

    /// Insert a new result, or bump `occurrences` and refresh the score on
    /// the existing row sharing `content_hash` (§3: content_hash is unique,
    /// the Worker re-scores/merges rather than duplicating).
    ///
    /// `base_score` is the scorer's pre-boost score for this hit, not the
    /// in-process `Deduplicator`'s boosted value: the occurrence boost is
    /// recomputed here from the row's persisted `occurrences` column so a
    /// boost earned over many past runs isn't lost to a freshly-restarted,
    /// unseeded `Deduplicator` that only just started counting.
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert_by_content_hash(
        db: &DatabaseConnection,
        failure_id: i64,
        title: String,
        description: String,
        url: String,
        provider_type: String,
        country: Option<String>,
        language: String,
        query: Option<String>,
        base_score: f64,
        origin_provider: String,
        content_hash: String,
        url_valid: bool,
    ) -> Result<Model, DbErr> {
        if let Some(existing) = Self::find_by_content_hash(db, &content_hash).await? {
            let new_occurrences = existing.occurrences + 1;
            let boosted = boost_for_occurrences(base_score, new_occurrences);
            let mut active: ActiveModel = existing.into();
            active.occurrences = Set(new_occurrences);
            active.confidence_score = Set(boosted);
            active.updated_at = Set(Utc::now());
            return active.update(db).await;
        }

        let active = ActiveModel {
            id: Default::default(),
            failure_id: Set(failure_id),
            title: Set(title),
            description: Set(description),
            url: Set(url),
            provider_type: Set(provider_type),
            country: Set(country),
            language: Set(language),
            query: Set(query),
            confidence_score: Set(base_score),
            occurrences: Set(1),
            origin_provider: Set(origin_provider),
            content_hash: Set(content_hash),
            url_valid: Set(url_valid),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            title_pt: Set(None),
            description_pt: Set(None),
            title_en: Set(None),
            description_en: Set(None),
        };
        active.insert(db).await
    }

    pub async fn update_translation(
        db: &DatabaseConnection,
        id: i64,
        title_pt: Option<String>,
        description_pt: Option<String>,
        title_en: Option<String>,
        description_en: Option<String>,
    ) -> Result<Option<Model>, DbErr> {
        let Some(existing) = Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let mut active: ActiveModel = existing.into();
        active.title_pt = Set(title_pt);
        active.description_pt = Set(description_pt);
        active.title_en = Set(title_en);
        active.description_en = Set(description_en);
        active.updated_at = Set(Utc::now());
        Ok(Some(active.update(db).await?))
    }

    pub async fn update_score(db: &DatabaseConnection, id: i64, score: f64) -> Result<Option<Model>, DbErr> {
        let Some(existing) = Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let mut active: ActiveModel = existing.into();
        active.confidence_score = Set(score);
        active.updated_at = Set(Utc::now());
        Ok(Some(active.update(db).await?))
    }

    pub async fn top_by_failure(
        db: &DatabaseConnection,
        failure_id: i64,
        n: u64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::FailureId.eq(failure_id))
            .order_by_desc(Column::ConfidenceScore)
            .limit(n)
            .all(db)
            .await
    }
}
