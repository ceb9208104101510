use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Only the two propagating kinds from the error taxonomy (§7) surface as
/// `Err` out of this crate; every other kind is absorbed where it's
/// observed and turned into a counter increment or a log line.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid queue item: {0}")]
    InvalidItem(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("fatal: {0}")]
    Fatal(String),
}
