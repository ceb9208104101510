use std::time::Duration;

use async_trait::async_trait;
use research_core::language;
use serde::Deserialize;

pub mod fallback;
pub mod gateway;

use crate::config::GatewayConfig;
use crate::error::Result;
use fallback::ModelFallbackRouter;
use gateway::GatewayClient;

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("pt", "Portuguese"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
];

fn language_name(code: &str) -> &str {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

#[derive(Deserialize)]
struct DetectAndTranslate {
    idioma_real: String,
    traducao: String,
}

/// Strip a leading/trailing ```-fenced code block, if the model wrapped its
/// JSON response in one despite being asked not to.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else { return trimmed };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// LLM-gateway-backed translation service (C2). Wraps [`ModelFallbackRouter`]
/// with the validation rule from §4.2: a translation whose detected language
/// still equals the source is discarded, not returned as a passthrough.
pub struct LlmTranslationService {
    router: ModelFallbackRouter,
}

impl LlmTranslationService {
    pub fn from_config(config: GatewayConfig) -> Result<Self> {
        let client = GatewayClient::new(
            config.base_url,
            config.api_key,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self {
            router: ModelFallbackRouter::new(client, config.free_models, config.premium_models),
        })
    }

    /// `translate` (§4.2): free-tier models only, validated against passthrough.
    pub async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        let prompt = format!(
            "Translate the following text from {} to {}:\n\n{}",
            language_name(source_lang),
            language_name(target_lang),
            text
        );
        let translated = self.router.translate(&prompt).await.ok()?;
        if translated.trim().is_empty() {
            return None;
        }
        let (detected, _) = language::detect(&translated);
        if detected == source_lang {
            None
        } else {
            Some(translated)
        }
    }

    /// `detect_and_translate` (§4.2): one gateway call asks the model to
    /// both detect the source language and translate in the same response,
    /// since the model's judgment of the source language is authoritative
    /// and overrides any prior assumption — never the local keyword
    /// heuristic, which is only used for the passthrough check in
    /// [`Self::translate`].
    pub async fn detect_and_translate(
        &self,
        text: &str,
        assumed_source: &str,
        target: &str,
    ) -> Option<(String, String)> {
        if text.trim().is_empty() {
            return None;
        }
        let target_name = language_name(target);
        let prompt = format!(
            "Analyze and translate the following text to {target_name}.\n\n\
             IMPORTANT INSTRUCTIONS:\n\
             1. First, detect the ACTUAL language of the source text (it might \
             differ from what was assumed).\n\
             2. Translate to {target_name}.\n\
             3. Preserve original capitalization, formatting, and structure.\n\
             4. Return ONLY in this exact JSON format (no markdown, no explanation):\n\n\
             {{\"idioma_real\": \"<2-letter ISO code like pt, en, es, it, fr, de>\", \"traducao\": \"<translated text>\"}}\n\n\
             Text to analyze and translate:\n{text}"
        );

        let raw = self.router.translate(&prompt).await.ok()?;
        let cleaned = strip_code_fence(&raw);
        let parsed: DetectAndTranslate = serde_json::from_str(cleaned).ok()?;
        if parsed.traducao.trim().is_empty() {
            return None;
        }

        let detected = parsed.idioma_real.to_lowercase().chars().take(2).collect::<String>();
        let detected = if detected.is_empty() { assumed_source.to_string() } else { detected };
        Some((parsed.traducao, detected))
    }

    /// Premium-tier "deep" analysis, never reached automatically.
    pub async fn analyze_deep(&self, prompt: &str) -> Result<String> {
        self.router.analyze_deep(prompt).await
    }
}

#[async_trait]
impl research_core::services::Translator for LlmTranslationService {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Option<String> {
        LlmTranslationService::translate(self, text, source_lang, target_lang).await
    }

    async fn detect_and_translate(
        &self,
        text: &str,
        assumed_source: &str,
        target_lang: &str,
    ) -> Option<(String, String)> {
        LlmTranslationService::detect_and_translate(self, text, assumed_source, target_lang).await
    }
}

#[async_trait]
impl research_core::query_gen::QueryTranslator for LlmTranslationService {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Option<String> {
        LlmTranslationService::translate(self, text, source_lang, target_lang).await
    }
}
