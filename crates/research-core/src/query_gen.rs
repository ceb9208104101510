//! Query Generator (C7, §4.7).

use crate::models::{Failure, QueryVariant};
use async_trait::async_trait;

pub const MAX_VARIANTS: usize = 6;

/// Narrow seam C7 needs from the translation layer, so this crate never has
/// to depend on `research-translate` (which in turn depends on this crate
/// for language detection). Implemented there by wrapping the real C2
/// service.
#[async_trait]
pub trait QueryTranslator: Send + Sync {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Option<String>;
}

/// Up to 6 query variants derived from a Failure, in generation order,
/// deduplicated preserving first occurrence (SPEC_FULL §4.7).
pub fn generate_variants(failure: &Failure) -> Vec<String> {
    let mut variants = Vec::new();

    // 1. title alone
    if !failure.title.trim().is_empty() {
        variants.push(failure.title.clone());
    }

    // 2. title + first 3 description tokens
    let desc_lead: Vec<&str> = failure.description.split_whitespace().take(3).collect();
    if !failure.title.trim().is_empty() && !desc_lead.is_empty() {
        variants.push(format!("{} {}", failure.title, desc_lead.join(" ")));
    }

    // 3. search hint alone
    if let Some(hint) = &failure.search_hint {
        if !hint.trim().is_empty() {
            variants.push(hint.clone());
        }
    }

    // 4. "how to solve: " + first 80 chars of description
    if !failure.description.trim().is_empty() {
        let snippet: String = failure.description.chars().take(80).collect();
        variants.push(format!("how to solve: {snippet}"));
    }

    // 5 & 6. derived from the first keyword of the search hint
    if let Some(first_keyword) = failure
        .search_hint
        .as_deref()
        .and_then(|h| h.split(|c: char| c == ',' || c.is_whitespace()).find(|w| !w.is_empty()))
    {
        variants.push(format!("solution for {first_keyword} in startups"));
        variants.push(format!("public policy for {first_keyword}"));
    }

    let mut seen = std::collections::HashSet::new();
    variants.retain(|v| seen.insert(v.clone()));
    variants.truncate(MAX_VARIANTS);
    variants
}

/// Expand each variant across every target language. Translation goes
/// through `translator`; if it fails for a (variant, language) pair the
/// original text is emitted with a language-tag prefix so queueing isn't
/// blocked — expected to be rare, and any contamination is expected to be
/// caught later by the scorer's language validation (§4.7).
pub async fn generate_multilingual_queries(
    failure: &Failure,
    languages: &[String],
    source_lang: &str,
    translator: &dyn QueryTranslator,
) -> Vec<QueryVariant> {
    let variants = generate_variants(failure);
    let mut out = Vec::with_capacity(variants.len() * languages.len());

    for (idx, variant) in variants.iter().enumerate() {
        for lang in languages {
            let text = if lang == source_lang {
                variant.clone()
            } else {
                match translator.translate(variant, source_lang, lang).await {
                    Some(translated) => translated,
                    None => format!("[{}] {}", lang.to_uppercase(), variant),
                }
            };
            out.push(QueryVariant {
                failure_id: failure.id,
                text,
                language: lang.clone(),
                variation_index: idx as u8,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_failure() -> Failure {
        Failure {
            id: 1,
            title: "Access to credit".to_string(),
            pillar: "Finance".to_string(),
            description: "Startups struggle to obtain initial financing".to_string(),
            search_hint: Some("credit, financing, startup".to_string()),
        }
    }

    #[test]
    fn generates_up_to_six_deduped_variants() {
        let variants = generate_variants(&sample_failure());
        assert!(variants.len() <= MAX_VARIANTS);
        assert!(variants.contains(&"Access to credit".to_string()));
        let mut seen = std::collections::HashSet::new();
        assert!(variants.iter().all(|v| seen.insert(v.clone())));
    }

    #[test]
    fn skips_variants_with_missing_source_field() {
        let mut failure = sample_failure();
        failure.search_hint = None;
        let variants = generate_variants(&failure);
        assert!(variants.iter().all(|v| !v.starts_with("solution for")));
    }

    struct FailingTranslator;
    #[async_trait]
    impl QueryTranslator for FailingTranslator {
        async fn translate(&self, _text: &str, _source: &str, _target: &str) -> Option<String> {
            None
        }
    }

    #[tokio::test]
    async fn falls_back_to_bracket_tag_when_translation_fails() {
        let failure = sample_failure();
        let languages = vec!["pt".to_string(), "en".to_string()];
        let out =
            generate_multilingual_queries(&failure, &languages, "pt", &FailingTranslator).await;
        assert!(out.iter().any(|q| q.language == "en" && q.text.starts_with("[EN]")));
        assert!(out.iter().any(|q| q.language == "pt" && !q.text.starts_with('[')));
    }
}
