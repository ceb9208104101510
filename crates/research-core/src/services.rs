//! Shared services container (§9: "explicit handles, not globals disguised
//! as module attributes").
//!
//! The original kept its translator, embedding client, and vector store as
//! module-level singletons reached from anywhere. Here each long-lived
//! service is constructed once and handed around as an `Arc`, bundled into
//! one container so a Worker only needs to thread a single value through its
//! call graph instead of a handful of independently-initialized globals.

use std::sync::Arc;

use crate::dedup::Deduplicator;
use crate::language;

/// Narrow seam this crate needs from the embedding/vector layer, so it can
/// expose `Services` without depending on `research-vector` directly (that
/// crate depends on this one for domain types). Implemented there.
#[async_trait::async_trait]
pub trait EmbeddingBackend: Send + Sync {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Narrow seam this crate needs from `research-translate`.
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Option<String>;

    /// Detect the real source language and translate in one call; the
    /// model's judgment overrides `assumed_source` (§4.2). Returns
    /// `(translated_text, detected_source_lang)`.
    async fn detect_and_translate(
        &self,
        text: &str,
        assumed_source: &str,
        target_lang: &str,
    ) -> Option<(String, String)>;
}

/// Bundle of process-wide collaborators a Worker (or any long-running
/// component) needs. Constructed once at startup and cloned cheaply
/// (everything inside is an `Arc`).
#[derive(Clone)]
pub struct Services {
    pub translator: Arc<dyn Translator>,
    pub embeddings: Arc<dyn EmbeddingBackend>,
    pub dedup: Arc<tokio::sync::Mutex<Deduplicator>>,
}

impl Services {
    pub fn new(
        translator: Arc<dyn Translator>,
        embeddings: Arc<dyn EmbeddingBackend>,
        jaccard_threshold: f64,
    ) -> Self {
        Self {
            translator,
            embeddings,
            dedup: Arc::new(tokio::sync::Mutex::new(Deduplicator::new(jaccard_threshold))),
        }
    }

    /// Translate `text` and validate the result isn't a silent passthrough
    /// in the source language (§4.2: "a translation whose detected language
    /// still matches the source is discarded, never stored").
    pub async fn translate_validated(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Option<String> {
        let translated = self.translator.translate(text, source_lang, target_lang).await?;
        let (detected, _) = language::detect(&translated);
        if detected == source_lang {
            None
        } else {
            Some(translated)
        }
    }

    /// As [`Self::translate_validated`], but using the detect-and-translate
    /// seam: the returned source language is whatever the model detected,
    /// not `assumed_source`, and the passthrough check compares against
    /// that detected language rather than the caller's assumption.
    pub async fn detect_and_translate_validated(
        &self,
        text: &str,
        assumed_source: &str,
        target_lang: &str,
    ) -> Option<(String, String)> {
        let (translated, detected_source) =
            self.translator.detect_and_translate(text, assumed_source, target_lang).await?;
        let (output_lang, _) = language::detect(&translated);
        if output_lang == detected_source {
            None
        } else {
            Some((translated, detected_source))
        }
    }
}
