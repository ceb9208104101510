//! Shared adapter behavior (§4.1): URL denylisting, description truncation,
//! and the sticky degraded-mode latch. Every concrete adapter routes its raw
//! HTTP response through this harness instead of reimplementing the rules
//! itself.

use std::sync::atomic::{AtomicBool, Ordering};

use research_core::models::SearchHit;

/// Default cap on a hit's description length before it's handed to the
/// scorer/deduplicator.
pub const DEFAULT_DESCRIPTION_CAP: usize = 500;

const DENYLISTED_DOMAINS: &[&str] = &[
    "google.com",
    "google.com.br",
    "bing.com",
    "duckduckgo.com",
    "search.yahoo.com",
    "baidu.com",
    "yandex.com",
];

const PLACEHOLDER_MARKERS: &[&str] = &["example.com", "localhost", "lorem-ipsum"];

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url).ok().and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Whether `url` points at a search engine's own result page or an obvious
/// placeholder, and should be dropped before the hit is ever scored.
pub fn is_denylisted(url: &str) -> bool {
    let Some(host) = host_of(url) else { return true };
    DENYLISTED_DOMAINS.iter().any(|d| host == *d || host.ends_with(&format!(".{d}")))
        || PLACEHOLDER_MARKERS.iter().any(|m| host.contains(m))
}

fn truncate(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        text.to_string()
    } else {
        text.chars().take(cap).collect()
    }
}

/// Filter out denylisted hits and truncate descriptions to `cap`.
pub fn finalize_hits(raw: Vec<SearchHit>, cap: usize) -> Vec<SearchHit> {
    raw.into_iter()
        .filter(|hit| !is_denylisted(&hit.url))
        .map(|mut hit| {
            hit.description = truncate(&hit.description, cap);
            hit
        })
        .collect()
}

/// Sticky per-adapter degraded flag (§4.1): set on 402/429, never cleared.
/// Process-local, no coordination across workers.
#[derive(Default)]
pub struct DegradedLatch {
    flag: AtomicBool,
}

impl DegradedLatch {
    pub fn new() -> Self {
        Self { flag: AtomicBool::new(false) }
    }

    pub fn set(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denylists_search_engine_domains() {
        assert!(is_denylisted("https://www.google.com/search?q=x"));
        assert!(is_denylisted("https://bing.com/search?q=x"));
        assert!(!is_denylisted("https://example.org/article"));
    }

    #[test]
    fn denylists_placeholder_domains() {
        assert!(is_denylisted("https://example.com/foo"));
    }

    #[test]
    fn truncates_long_descriptions() {
        let long = "a".repeat(1000);
        let hit = SearchHit {
            title: "t".to_string(),
            description: long,
            url: "https://real-site.org/page".to_string(),
            published_at: None,
            provider: "test".to_string(),
        };
        let out = finalize_hits(vec![hit], 100);
        assert_eq!(out[0].description.chars().count(), 100);
    }

    #[test]
    fn latch_is_sticky() {
        let latch = DegradedLatch::new();
        assert!(!latch.is_set());
        latch.set();
        assert!(latch.is_set());
        latch.set();
        assert!(latch.is_set());
    }
}
