use thiserror::Error;

/// Internal transport-level error, mapped by each adapter's `search()` into a
/// [`research_core::models::ProviderCallStatus`] before it reaches a caller —
/// adapters never propagate a bare `Err` for an ordinary failure (§7:
/// transient transport and provider-quota kinds are both non-fatal).
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("quota exhausted")]
    QuotaExhausted,

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("provider API error {status_code}: {message}")]
    ApiError { status_code: u16, message: String },

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            match status.as_u16() {
                402 => ProviderError::QuotaExhausted,
                429 => ProviderError::RateLimitExceeded,
                401 | 403 => ProviderError::AuthenticationFailed(status.to_string()),
                code => ProviderError::ApiError { status_code: code, message: err.to_string() },
            }
        } else if err.is_timeout() {
            ProviderError::NetworkError("request timed out".to_string())
        } else if err.is_connect() {
            ProviderError::NetworkError("connection failed".to_string())
        } else {
            ProviderError::NetworkError(err.to_string())
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
