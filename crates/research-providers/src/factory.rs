//! Builds the set of enabled [`SearchProvider`] adapters from [`Settings`]
//! (§4.1): an adapter is included only if its API key is present and its
//! `providers_enabled` flag is on, mirroring the teacher's
//! `ProviderFactory::create_all`.

use std::sync::Arc;

use research_core::config::Settings;
use research_core::models::ProviderKind;

use crate::deep_research::DeepResearchProvider;
use crate::exa::ExaProvider;
use crate::jina::JinaProvider;
use crate::perplexity::PerplexityProvider;
use crate::serper::SerperProvider;
use crate::tavily::TavilyProvider;
use crate::traits::SearchProvider;

pub struct ProviderFactory<'a> {
    settings: &'a Settings,
}

impl<'a> ProviderFactory<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    fn enabled(&self, kind: ProviderKind) -> bool {
        self.settings.providers_enabled.get(kind.as_str()).copied().unwrap_or(false)
    }

    /// One adapter instance per (enabled, credentialed) provider, built in
    /// [`ProviderKind::ALL`] order.
    pub fn create_all(&self) -> Vec<Arc<dyn SearchProvider>> {
        let mut providers: Vec<Arc<dyn SearchProvider>> = Vec::new();

        if self.enabled(ProviderKind::Perplexity) {
            providers.push(Arc::new(PerplexityProvider::new(self.settings.perplexity_api_key.clone())));
        }
        if self.enabled(ProviderKind::Jina) {
            providers.push(Arc::new(JinaProvider::new(self.settings.jina_api_key.clone())));
        }
        if self.enabled(ProviderKind::Tavily) {
            if let Some(key) = &self.settings.tavily_api_key {
                providers.push(Arc::new(TavilyProvider::new(key.clone())));
            }
        }
        if self.enabled(ProviderKind::Serper) {
            if let Some(key) = &self.settings.serper_api_key {
                providers.push(Arc::new(SerperProvider::new(key.clone())));
            }
        }
        if self.enabled(ProviderKind::Exa) {
            if let Some(key) = &self.settings.exa_api_key {
                providers.push(Arc::new(ExaProvider::new(key.clone())));
            }
        }
        if self.enabled(ProviderKind::DeepResearch) {
            providers.push(Arc::new(DeepResearchProvider::new()));
        }

        providers
    }
}
