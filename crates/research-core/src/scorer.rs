//! Multi-factor confidence scorer (C5, §4.5).

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Occurrence count above which the occurrence factor stops growing.
pub const OCCURRENCE_CAP: u32 = 5;
/// Multiplier applied when the content looks Brazil-specific.
pub const BRAZIL_BONUS: f64 = 0.20;
/// Bounds on the RAG adjustment (§4.5).
pub const RAG_BOOST_CAP: f64 = 0.20;
pub const RAG_CUT_CAP: f64 = -0.30;
/// Breakpoints of the mid-range expansion curve (§9 resolved design note).
pub const EXPANSION_LO: f64 = 0.35;
pub const EXPANSION_HI: f64 = 0.75;

const META_ANSWER_PHRASES: &[&str] = &[
    "here are",
    "below are",
    "voici",
    "aquí tienes",
    "aqui estão",
    "aqui estao",
    "ecco",
    "hier sind",
    "veja a seguir",
];

const EMPTY_RESULT_PHRASES: &[&str] = &[
    "no results found",
    "not found",
    "no relevant results",
    "no information available",
    "nenhum resultado encontrado",
    "no se encontraron resultados",
    "keine ergebnisse",
    "nessun risultato trovato",
];

/// Provider trust weight lookup: exact match on the provider identifier,
/// then substring match (so `"my-blog-feed"` still hits the `"blog"`
/// entry), then the default for anything unrecognized (§4.5).
const TRUST_WEIGHTS: &[(&str, f64)] = &[
    ("perplexity", 0.95),
    ("jina", 0.90),
    ("deep_research", 0.85),
    ("google", 0.80),
    ("wikipedia", 0.75),
    ("blog", 0.50),
    ("social_media", 0.30),
];
const DEFAULT_TRUST_WEIGHT: f64 = 0.40;

pub fn provider_trust_weight(provider: &str) -> f64 {
    let lower = provider.to_lowercase();
    if let Some((_, weight)) = TRUST_WEIGHTS.iter().find(|(name, _)| *name == lower) {
        return *weight;
    }
    if let Some((_, weight)) = TRUST_WEIGHTS.iter().find(|(name, _)| lower.contains(name)) {
        return *weight;
    }
    DEFAULT_TRUST_WEIGHT
}

const STOP_WORDS: &[&str] = &[
    "a", "o", "e", "de", "do", "da", "em", "um", "uma", "para", "com", "que", "os", "as", "no",
    "na", "the", "of", "and", "to", "in", "for", "is", "on", "at", "by", "an", "it", "this",
    "that", "el", "la", "los", "las", "un", "una", "le", "les", "der", "die", "und", "il",
];

fn keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 1 && !STOP_WORDS.contains(w))
        .map(|w| w.to_string())
        .collect()
}

fn content_tokens(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Relevance signal from query-vs-content keyword overlap (§4.5, design
/// level steps 1-3). Requires at least one non-stopword keyword or the
/// relevance (and hence the whole score) is zero.
pub fn relevance(query: &str, content: &str) -> f64 {
    let kq = keywords(query);
    if kq.is_empty() {
        return 0.0;
    }
    let tokens = content_tokens(content);
    let content_lower = content.to_lowercase();

    let mut exact = 0usize;
    let mut partial = 0usize;
    for kw in &kq {
        if tokens.contains(kw) {
            exact += 1;
        } else if tokens.iter().any(|t| t.contains(kw.as_str()) || kw.contains(t.as_str())) {
            partial += 1;
        }
    }

    let n = kq.len() as f64;
    let base = 0.75 * (exact as f64) / n;
    let partial_bonus = 0.10 * (partial as f64) / n;

    let normalized_query = keywords(query).join(" ");
    let phrase_bonus = if !normalized_query.is_empty() && content_lower.contains(&normalized_query)
    {
        0.25
    } else {
        0.0
    };

    (base + partial_bonus + phrase_bonus).min(1.0)
}

/// Fraction of query keywords present in the title alone.
pub fn title_match(query: &str, title: &str) -> f64 {
    let kq = keywords(query);
    if kq.is_empty() {
        return 0.0;
    }
    let title_tokens = content_tokens(title);
    let hits = kq.iter().filter(|kw| title_tokens.contains(*kw)).count();
    hits as f64 / kq.len() as f64
}

fn occurrence_factor(occurrences: u32) -> f64 {
    let capped = occurrences.min(OCCURRENCE_CAP).max(1) as f64;
    capped.sqrt() / (OCCURRENCE_CAP as f64).sqrt()
}

fn looks_brazilian(url: &str, text: &str) -> bool {
    let haystack = format!("{} {}", url.to_lowercase(), text.to_lowercase());
    haystack.contains(".gov.br")
        || haystack.contains(".com.br")
        || haystack.contains("brasil")
        || haystack.contains("brazil")
}

fn is_meta_answer(title: &str, description: &str) -> bool {
    let text = format!("{} {}", title.to_lowercase(), description.to_lowercase());
    META_ANSWER_PHRASES.iter().any(|p| text.contains(p))
}

fn is_empty_result(title: &str, description: &str) -> bool {
    let text = format!("{} {}", title.to_lowercase(), description.to_lowercase());
    EMPTY_RESULT_PHRASES.iter().any(|p| text.contains(p))
}

/// Smoothstep-style expansion of the middle of the score range so mid-quality
/// results aren't crushed into one narrow band (§4.5, §9).
fn expand_midrange(x: f64) -> f64 {
    if x <= EXPANSION_LO || x >= EXPANSION_HI {
        return x;
    }
    let t = (x - EXPANSION_LO) / (EXPANSION_HI - EXPANSION_LO);
    EXPANSION_LO + (EXPANSION_HI - EXPANSION_LO) * (3.0 * t * t - 2.0 * t * t * t)
}

/// Inputs the scorer needs for one candidate; callers adapt their own
/// richer result type into this.
pub struct ScoreInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub url: &'a str,
    pub query: &'a str,
    pub provider: &'a str,
    pub occurrences: u32,
}

/// Previously-scored similar results found via the vector store, used for
/// the optional RAG adjustment. Empty when RAG is disabled or nothing
/// similar was found.
#[derive(Default)]
pub struct RagContext {
    pub similar_scores: Vec<f64>,
}

fn rag_adjustment(ctx: &RagContext) -> f64 {
    let mut delta = 0.0;
    for &score in &ctx.similar_scores {
        if score > 0.75 {
            delta += 0.10;
        } else if score < 0.5 {
            delta -= 0.15;
        }
    }
    delta.clamp(RAG_CUT_CAP, RAG_BOOST_CAP)
}

/// Produce `score ∈ [0,1]` for one candidate against its originating query.
pub fn score(input: &ScoreInput, rag: Option<&RagContext>) -> f64 {
    if keywords(input.query).is_empty() {
        return 0.0;
    }
    let content = format!("{} {}", input.title, input.description);
    let rel = relevance(input.query, &content);

    let occ = occurrence_factor(input.occurrences);
    let trust = provider_trust_weight(input.provider);
    let tmatch = title_match(input.query, input.title);

    let composed = 0.55 * rel + 0.15 * occ + 0.20 * trust + 0.10 * tmatch;
    let mut value = expand_midrange(composed);

    if looks_brazilian(input.url, &content) {
        value *= 1.0 + BRAZIL_BONUS;
    }

    if let Some(rag) = rag {
        value += rag_adjustment(rag);
    }

    let meta = is_meta_answer(input.title, input.description);
    let empty = is_empty_result(input.title, input.description);
    value *= match (meta, empty) {
        (true, true) => 0.05,
        (true, false) => 0.30,
        (false, true) => 0.20,
        (false, false) => 1.0,
    };

    value.clamp(0.0, 1.0)
}

/// Score cache keyed by `(url, query, use_rag)` (§4.5). Guarded by a mutex
/// rather than exposed as a bare global per the shared-services design note
/// (§9); a double-miss race just recomputes once more, which is safe
/// because the function is pure over its inputs.
#[derive(Default)]
pub struct ScoreCache {
    entries: Mutex<HashMap<(String, String, bool), f64>>,
}

impl ScoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &self,
        url: &str,
        query: &str,
        use_rag: bool,
        compute: impl FnOnce() -> f64,
    ) -> f64 {
        let key = (url.to_string(), query.to_string(), use_rag);
        if let Some(v) = self.entries.lock().unwrap().get(&key) {
            return *v;
        }
        let value = compute();
        self.entries.lock().unwrap().insert(key, value);
        value
    }
}

/// Recommendation the quality-of-set appraisal hands back to the Adaptive
/// Search Executor (C9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Stop,
    Maybe,
    Continue,
}

#[derive(Debug, Clone)]
pub struct QualityAppraisal {
    pub overall_quality: f64,
    pub confidence: f64,
    pub diversity: f64,
    pub recommendation: Recommendation,
    pub reason: String,
}

/// One already-scored hit, as far as the appraisal needs to know.
pub struct AppraisalInput<'a> {
    pub score: f64,
    pub provider: &'a str,
}

/// Appraise the quality of a set of results gathered so far for one query
/// (§4.5). Used by the Adaptive Search Executor to decide whether to keep
/// calling providers.
pub fn appraise_quality(results: &[AppraisalInput], min_quality: f64) -> QualityAppraisal {
    if results.is_empty() {
        return QualityAppraisal {
            overall_quality: 0.0,
            confidence: 0.0,
            diversity: 0.0,
            recommendation: Recommendation::Continue,
            reason: "no results yet".to_string(),
        };
    }

    let scores: Vec<f64> = results.iter().map(|r| r.score).collect();
    let overall_quality = scores.iter().sum::<f64>() / scores.len() as f64;
    let spread = scores.iter().cloned().fold(f64::MIN, f64::max)
        - scores.iter().cloned().fold(f64::MAX, f64::min);
    let confidence = 0.7 * overall_quality + 0.3 * (1.0 - spread.min(1.0));

    let distinct_providers: HashSet<&str> = results.iter().map(|r| r.provider).collect();
    let diversity = (distinct_providers.len() as f64 / 5.0).min(1.0);

    let (recommendation, reason) = if overall_quality >= min_quality && confidence >= 0.6 {
        (Recommendation::Stop, "quality bar cleared with high confidence".to_string())
    } else if overall_quality >= min_quality * 0.85 || (spread < 0.10 && scores.len() >= 2) {
        (
            Recommendation::Maybe,
            "borderline quality or redundant results, one more call may help".to_string(),
        )
    } else {
        (Recommendation::Continue, "quality bar not yet cleared".to_string())
    };

    QualityAppraisal {
        overall_quality,
        confidence,
        diversity,
        recommendation,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_zero_without_keywords() {
        let input = ScoreInput {
            title: "a",
            description: "b",
            url: "https://example.com",
            query: "",
            provider: "perplexity",
            occurrences: 1,
        };
        assert_eq!(score(&input, None), 0.0);
    }

    #[test]
    fn meta_answer_penalizes_heavily() {
        let input = ScoreInput {
            title: "Here are five relevant sources",
            description: "startup credit financing policy access",
            url: "https://example.gov/credit",
            query: "startup credit financing",
            provider: "perplexity",
            occurrences: 5,
        };
        assert!(score(&input, None) < 0.3);
    }

    #[test]
    fn occurrences_never_decrease_score() {
        let base = |occ| ScoreInput {
            title: "Startup Credit Guide",
            description: "how to get startup credit and financing",
            url: "https://example.gov/credit",
            query: "startup credit financing",
            provider: "jina",
            occurrences: occ,
        };
        let low = score(&base(1), None);
        let high = score(&base(5), None);
        assert!(high >= low);
    }

    #[test]
    fn trust_weight_exact_then_substring_then_default() {
        assert_eq!(provider_trust_weight("perplexity"), 0.95);
        assert_eq!(provider_trust_weight("my-blog-feed"), 0.50);
        assert_eq!(provider_trust_weight("unrecognized-tool"), DEFAULT_TRUST_WEIGHT);
    }

    #[test]
    fn appraisal_recommends_stop_on_strong_diverse_set() {
        let results = vec![
            AppraisalInput { score: 0.85, provider: "perplexity" },
            AppraisalInput { score: 0.82, provider: "jina" },
        ];
        let appraisal = appraise_quality(&results, 0.75);
        assert_eq!(appraisal.recommendation, Recommendation::Stop);
    }
}
