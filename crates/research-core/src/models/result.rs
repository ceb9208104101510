use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted, scored, deduplicated record of a hit (or merged hits).
///
/// Invariants (§3, §8): `confidence_score ∈ [0,1]`; `occurrences ≥ 1`;
/// `content_hash` is unique across the table; if `language != "pt"` then
/// `title_pt`/`description_pt` are populated whenever translation succeeded
/// and validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
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
    pub content_hash: String,
    pub url_valid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title_pt: Option<String>,
    pub description_pt: Option<String>,
    pub title_en: Option<String>,
    pub description_en: Option<String>,
}

impl ResultRecord {
    /// The text the scorer should compare against the query: PT translation
    /// when the result's own language isn't PT and a translation exists,
    /// else the original text (§4.5 language handling).
    pub fn scoring_title(&self) -> &str {
        if self.language != "pt" {
            if let Some(pt) = &self.title_pt {
                return pt;
            }
        }
        &self.title
    }

    pub fn scoring_description(&self) -> &str {
        if self.language != "pt" {
            if let Some(pt) = &self.description_pt {
                return pt;
            }
        }
        &self.description
    }
}

/// The four named vector-store collections (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorCollectionKind {
    Results,
    Failures,
    Queries,
    Documents,
}

impl VectorCollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorCollectionKind::Results => "results",
            VectorCollectionKind::Failures => "failures",
            VectorCollectionKind::Queries => "queries",
            VectorCollectionKind::Documents => "documents",
        }
    }
}

/// An audit row recording the outcome of one provider call, independent of
/// whether it produced a persisted [`ResultRecord`] (SPEC_FULL §11.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub failure_id: i64,
    pub query: String,
    pub language: String,
    pub provider: String,
    pub status: String,
    pub results_found: i32,
    pub error_message: Option<String>,
    pub elapsed_seconds: Option<f64>,
    pub executed_at: DateTime<Utc>,
}
