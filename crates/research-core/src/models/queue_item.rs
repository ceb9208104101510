use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a [`QueueItem`]. Transitions are monotone except the
/// recovery edge `InProgress -> Pending` (§3, §4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Pending,
    InProgress,
    Done,
    Error,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::InProgress => "in_progress",
            QueueStatus::Done => "done",
            QueueStatus::Error => "error",
        }
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(&self, next: QueueStatus) -> bool {
        use QueueStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (InProgress, Done)
                | (InProgress, Error)
                | (InProgress, Pending) // recovery edge, §4.10
        )
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One (failure, query variant, language, provider) unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: i64,
    pub failure_id: i64,
    pub query_text: String,
    pub language: String,
    pub provider: String,
    pub priority: i32,
    pub attempts: i32,
    pub max_attempts: i32,
    pub status: QueueStatus,
    pub created_at: DateTime<Utc>,
}

impl QueueItem {
    /// Required-fields check the Worker runs after claiming an item, before
    /// processing it (§4.10). An item failing this goes straight to
    /// `error`, no retry.
    pub fn validate(&self) -> Result<(), String> {
        if self.query_text.trim().is_empty() {
            return Err("query_text is empty".into());
        }
        if self.language.trim().is_empty() {
            return Err("language is empty".into());
        }
        if self.provider.trim().is_empty() {
            return Err("provider is empty".into());
        }
        if self.failure_id <= 0 {
            return Err("failure_id is missing".into());
        }
        Ok(())
    }
}
