use serde::{Deserialize, Serialize};

/// A structured problem record that defines a research topic.
///
/// Failures are created out-of-band (by the prioritization surface this
/// crate does not implement) and are read-only to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Failure {
    pub id: i64,
    pub title: String,
    pub pillar: String,
    pub description: String,
    pub search_hint: Option<String>,
}

/// One of the query strings C7 derives from a [`Failure`], in one target
/// language. Not persisted as a first-class entity: it is carried inside a
/// [`crate::models::QueueItem`] once queued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryVariant {
    pub failure_id: i64,
    pub text: String,
    pub language: String,
    pub variation_index: u8,
}
