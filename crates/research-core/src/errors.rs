use thiserror::Error;

/// Error kinds shared across the research pipeline.
///
/// Variants line up with the error taxonomy: most kinds are absorbed by the
/// component that observes them and never reach a caller as an `Err` — see
/// each crate's own error type for where that absorption happens. What
/// surfaces here is the subset that legitimately propagates: invalid input
/// and fatal conditions.
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("invalid queue item: {0}")]
    InvalidItem(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("fatal: {0}")]
    Fatal(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ResearchResult<T> = Result<T, ResearchError>;
