use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The search providers C1 knows how to wrap. `DeepResearch` exists but is
/// disabled by default (its integration is considered less stable than the
/// other five).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Perplexity,
    Jina,
    Tavily,
    Serper,
    Exa,
    DeepResearch,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 6] = [
        ProviderKind::Perplexity,
        ProviderKind::Jina,
        ProviderKind::Tavily,
        ProviderKind::Serper,
        ProviderKind::Exa,
        ProviderKind::DeepResearch,
    ];

    /// Providers enabled by default, in the order the source lists them.
    pub const DEFAULT_ENABLED: [ProviderKind; 5] = [
        ProviderKind::Perplexity,
        ProviderKind::Jina,
        ProviderKind::Tavily,
        ProviderKind::Serper,
        ProviderKind::Exa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Perplexity => "perplexity",
            ProviderKind::Jina => "jina",
            ProviderKind::Tavily => "tavily",
            ProviderKind::Serper => "serper",
            ProviderKind::Exa => "exa",
            ProviderKind::DeepResearch => "deep_research",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "perplexity" => Ok(ProviderKind::Perplexity),
            "jina" => Ok(ProviderKind::Jina),
            "tavily" => Ok(ProviderKind::Tavily),
            "serper" => Ok(ProviderKind::Serper),
            "exa" => Ok(ProviderKind::Exa),
            "deep_research" => Ok(ProviderKind::DeepResearch),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Outcome of one `search()` call against a provider adapter (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCallStatus {
    Ok,
    Empty,
    RateLimited,
    AuthFailed,
    QuotaExhausted,
    TransportError,
}

impl std::fmt::Display for ProviderCallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderCallStatus::Ok => "ok",
            ProviderCallStatus::Empty => "empty",
            ProviderCallStatus::RateLimited => "rate_limited",
            ProviderCallStatus::AuthFailed => "auth_failed",
            ProviderCallStatus::QuotaExhausted => "quota_exhausted",
            ProviderCallStatus::TransportError => "transport_error",
        };
        write!(f, "{s}")
    }
}

/// One (title, url, snippet) triple returned by a provider before
/// scoring/dedup. Transient — never persisted directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    pub provider: String,
}
