//! Keyword-frequency language detector (C2's non-LLM half, §4.2).
//!
//! Cheap and approximate by design: it exists to validate translations and
//! to guard against cross-language contamination, not to be a general
//! language-ID model. The LLM-backed `detect_and_translate` in
//! `research-translate` is authoritative for anything this heuristic can't
//! confidently call.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Minimum token count below which detection always reports `unknown`.
/// Text shorter than this is too ambiguous to classify (§4.2).
pub const MIN_TOKENS_FOR_DETECTION: usize = 3;

/// General confidence floor: a language guess below this ratio of matching
/// keywords is downgraded to `unknown`.
pub const CONFIDENCE_FLOOR: f64 = 0.10;

/// Stricter floor the Worker's cross-language contamination guard applies
/// on top of the general floor (§4.2, §4.10, scenario 5 of §8).
pub const CONTAMINATION_GUARD_CONFIDENCE: f64 = 0.15;

const PT_KEYWORDS: &[&str] = &[
    "o", "a", "que", "de", "e", "é", "para", "em", "com", "foi", "se", "não", "da", "do", "este",
    "essa", "você", "também", "pelo", "pela", "pelos", "pelas", "mais", "como", "mas", "seu",
    "sua", "seus", "suas", "qual", "quais", "quando", "onde", "quem", "quantos", "quanto",
    "português", "brasil", "brasileiro", "brasileira", "são", "estar", "poder", "dever", "ir",
    "vir", "fazer", "dia", "dias", "ano", "anos", "mes", "mês", "hora", "horas", "novo", "nova",
    "novos", "novas", "grande", "pequeno", "bom", "melhor", "pior", "igual", "diferente", "tal",
    "mesmo", "próprio", "certo", "errado", "verdadeiro", "importante", "necessário", "possível",
];

const EN_KEYWORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we",
    "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their",
    "what", "so", "up", "out", "if", "about", "who", "get", "which", "go", "me", "when", "make",
    "can", "like", "time", "no", "just", "him", "know", "take", "people", "into", "year", "your",
    "good", "some", "could", "them", "see", "other", "than", "then", "now", "look", "only",
    "come", "its", "over", "think", "also",
];

const ES_KEYWORDS: &[&str] = &[
    "el", "la", "de", "que", "y", "a", "en", "un", "ser", "se", "no", "haber", "por", "con", "su",
    "para", "es", "como", "estar", "tener", "le", "lo", "todo", "pero", "más", "hacer", "o",
    "poder", "decir", "este", "ir", "otro", "ese", "si", "me", "ya", "ver", "porque", "dar",
    "cuando", "él", "muy", "sin", "vez", "mucho", "saber", "qué", "sobre", "mi", "alguno",
    "mismo", "yo", "también", "hasta", "año", "dos", "querer", "entre", "así", "primero",
    "desde", "grande", "eso", "ni", "nos", "durante", "estado", "todos", "uno", "les", "español",
    "españa", "mexicano", "argentina",
];

const FR_KEYWORDS: &[&str] = &[
    "de", "le", "et", "à", "un", "en", "que", "pour", "est", "par", "se", "pas", "plus",
    "pouvoir", "ne", "sur", "être", "ce", "dit", "dans", "ont", "qui", "du", "avec", "la", "il",
    "vous", "faire", "des", "au", "dire", "aller", "lui", "me", "monde", "temps", "venir", "peut",
    "tout", "année", "montrer", "sans", "autre", "tant", "bien", "même", "cas", "jour", "homme",
    "fois", "nouveau", "part", "où", "français", "france", "paris", "monsieur", "madame",
];

const DE_KEYWORDS: &[&str] = &[
    "der", "die", "und", "in", "den", "von", "zu", "das", "mit", "sich", "des", "auf", "für",
    "ist", "im", "dem", "nicht", "ein", "eine", "als", "auch", "es", "an", "werden", "aus", "er",
    "hat", "dass", "sie", "nach", "wird", "bei", "einer", "um", "am", "sind", "noch", "wie",
    "einem", "über", "einen", "so", "zum", "war", "haben", "nur", "oder", "aber", "deutsch",
    "deutschland", "berlin", "münchen", "hamburg",
];

const IT_KEYWORDS: &[&str] = &[
    "di", "il", "che", "e", "la", "per", "un", "in", "è", "una", "con", "del", "da", "non", "si",
    "della", "dei", "le", "delle", "al", "alla", "sono", "anche", "degli", "agli", "alle", "come",
    "ma", "più", "nel", "nella", "essere", "suo", "sua", "questo", "hanno", "aveva", "loro",
    "fare", "può", "quando", "italia", "italiano", "italiana", "roma", "milano", "venezia",
];

fn keyword_sets() -> &'static [(&'static str, HashSet<&'static str>)] {
    static SETS: OnceLock<Vec<(&'static str, HashSet<&'static str>)>> = OnceLock::new();
    SETS.get_or_init(|| {
        vec![
            ("pt", PT_KEYWORDS.iter().copied().collect()),
            ("en", EN_KEYWORDS.iter().copied().collect()),
            ("es", ES_KEYWORDS.iter().copied().collect()),
            ("fr", FR_KEYWORDS.iter().copied().collect()),
            ("de", DE_KEYWORDS.iter().copied().collect()),
            ("it", IT_KEYWORDS.iter().copied().collect()),
        ]
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub confidence: f64,
}

/// Detect the language of `text` via keyword-frequency heuristic.
///
/// Returns `("unknown", 0.0)` for empty text, text under
/// [`MIN_TOKENS_FOR_DETECTION`] words, or when the best-matching language
/// scores below [`CONFIDENCE_FLOOR`].
pub fn detect(text: &str) -> (String, f64) {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();

    if tokens.is_empty() || tokens.len() < MIN_TOKENS_FOR_DETECTION {
        return ("unknown".to_string(), 0.0);
    }

    let total = tokens.len() as f64;
    let mut best_lang = "unknown";
    let mut best_score = 0.0_f64;

    for (lang, keywords) in keyword_sets() {
        let matches = tokens.iter().filter(|t| keywords.contains(*t)).count() as f64;
        let score = matches / total;
        if score > best_score {
            best_score = score;
            best_lang = lang;
        }
    }

    if best_score >= CONFIDENCE_FLOOR {
        (best_lang.to_string(), best_score)
    } else {
        ("unknown".to_string(), 0.0)
    }
}

/// Whether `title`/`description` together read as the expected language:
/// valid if the detector agrees, or if it couldn't tell (`unknown`) — short
/// or ambiguous text should never be treated as a mismatch (§4.2).
pub fn is_valid_language(title: &str, description: &str, expected: &str) -> (bool, String, f64) {
    let combined = format!("{title} {description}");
    let (detected, confidence) = detect(&combined);
    let valid = detected == expected || detected == "unknown";
    (valid, detected, confidence)
}
