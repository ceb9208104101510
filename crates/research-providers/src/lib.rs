//! Concrete [`SearchProvider`] adapters (§4.1): one module per search API,
//! a shared harness for cross-cutting behavior, and a factory that builds
//! the enabled set from [`research_core::config::Settings`].

pub mod deep_research;
pub mod error;
pub mod exa;
pub mod factory;
pub mod harness;
pub mod jina;
pub mod perplexity;
pub mod serper;
pub mod tavily;
pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use deep_research::DeepResearchProvider;
pub use error::ProviderError;
pub use exa::ExaProvider;
pub use factory::ProviderFactory;
pub use jina::JinaProvider;
pub use perplexity::PerplexityProvider;
pub use serper::SerperProvider;
pub use tavily::TavilyProvider;
pub use traits::SearchProvider;
