use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("gateway API error: {0}")]
    Api(String),
}
