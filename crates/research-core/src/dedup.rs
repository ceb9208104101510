//! Near-duplicate detection (C6, §4.6).
//!
//! Three levels, cheapest first: canonical hash, Jaccard over token sets,
//! then (left to the caller, since it needs the vector store) semantic
//! similarity. This module owns the first two and the occurrence-boost
//! bookkeeping; the Worker drives the optional semantic tier itself because
//! it is the only layer holding a handle to C4.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

pub const DEFAULT_JACCARD_THRESHOLD: f64 = 0.80;
pub const DEFAULT_SEMANTIC_THRESHOLD: f64 = 0.85;
const OCCURRENCE_BOOST_PER_EXTRA: f64 = 0.05;
const OCCURRENCE_BOOST_CAP: f64 = 0.30;

/// Occurrence-based score boost (§4.6), as a pure function of the
/// cumulative occurrence count rather than the in-process [`Deduplicator`]'s
/// own bookkeeping. The persistence layer uses this directly against the
/// database's `occurrences` column so a boost earned over many past worker
/// runs survives a process restart, instead of being recomputed (and
/// overwritten) from whatever a fresh, unseeded `Deduplicator` happens to
/// have counted since it started.
pub fn boost_for_occurrences(base_score: f64, occurrences: u32) -> f64 {
    let extra = occurrences.saturating_sub(1) as f64;
    let boost = (extra * OCCURRENCE_BOOST_PER_EXTRA).min(OCCURRENCE_BOOST_CAP);
    (base_score + boost).min(1.0)
}

/// Lowercase, strip punctuation, collapse whitespace.
fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped: String = lower
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// SHA-256 of the normalized `title + ' ' + description`. Deterministic
/// regardless of input capitalization/whitespace (§8 invariant).
pub fn content_hash(title: &str, description: &str) -> String {
    let normalized = normalize(&format!("{title} {description}"));
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn token_set(text: &str) -> HashSet<String> {
    normalize(text)
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}

/// Jaccard similarity over whitespace token sets of `title + description`.
/// Two empty texts are identical (`1.0`); one empty and one not are
/// maximally dissimilar (`0.0`) — matching the source's edge case handling.
pub fn jaccard_similarity(a_title: &str, a_desc: &str, b_title: &str, b_desc: &str) -> f64 {
    let a = token_set(&format!("{a_title} {a_desc}"));
    let b = token_set(&format!("{b_title} {b_desc}"));

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(&b).count() as f64;
    let union = a.union(&b).count() as f64;
    intersection / union
}

/// The minimal shape the deduplicator needs to compare and boost candidates.
/// Callers adapt their richer `ResultRecord` into this before calling in.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub title: String,
    pub description: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct DedupStats {
    pub distinct_hashes: usize,
    pub total_occurrences: u64,
    pub duplicates_detected: u64,
    pub threshold: f64,
}

/// Outcome of running one candidate through the deduplicator.
#[derive(Debug, Clone)]
pub enum DedupOutcome {
    /// No existing match: this is a new, distinct result.
    New { content_hash: String },
    /// Matched an existing hash (exact or Jaccard): the survivor's
    /// occurrence count and boosted score to persist instead of inserting.
    Duplicate {
        existing_hash: String,
        occurrences: u32,
        boosted_score: f64,
    },
}

/// Process-local tracker of seen content, mirroring one Worker's lifetime
/// (§9's "process-local latches and caches" design note). The Worker seeds
/// it from persisted Results at startup so exact-hash checks agree with the
/// database's unique constraint; this module itself has no I/O.
pub struct Deduplicator {
    jaccard_threshold: f64,
    seen: HashMap<String, Candidate>,
    occurrences: HashMap<String, u32>,
    duplicates_detected: u64,
}

impl Deduplicator {
    pub fn new(jaccard_threshold: f64) -> Self {
        Self {
            jaccard_threshold,
            seen: HashMap::new(),
            occurrences: HashMap::new(),
            duplicates_detected: 0,
        }
    }

    /// Seed the tracker with an already-persisted record, e.g. at Worker
    /// startup or after a cache miss against the database.
    pub fn seed(&mut self, hash: String, candidate: Candidate, occurrences: u32) {
        self.occurrences.insert(hash.clone(), occurrences);
        self.seen.insert(hash, candidate);
    }

    /// Find an existing hash this candidate matches, by exact hash then
    /// Jaccard, without mutating any state.
    fn find_match(&self, candidate: &Candidate) -> Option<String> {
        let hash = content_hash(&candidate.title, &candidate.description);
        if self.seen.contains_key(&hash) {
            return Some(hash);
        }
        for (existing_hash, existing) in &self.seen {
            let sim = jaccard_similarity(
                &candidate.title,
                &candidate.description,
                &existing.title,
                &existing.description,
            );
            if sim >= self.jaccard_threshold {
                return Some(existing_hash.clone());
            }
        }
        None
    }

    pub fn is_new(&self, candidate: &Candidate) -> bool {
        self.find_match(candidate).is_none()
    }

    /// Run one candidate through the dedup pipeline, recording it either as
    /// new (keyed by its own content hash) or as a boost to an existing
    /// survivor.
    pub fn process(&mut self, candidate: Candidate) -> DedupOutcome {
        match self.find_match(&candidate) {
            None => {
                let hash = content_hash(&candidate.title, &candidate.description);
                self.occurrences.insert(hash.clone(), 1);
                self.seen.insert(hash.clone(), candidate);
                DedupOutcome::New { content_hash: hash }
            }
            Some(existing_hash) => {
                self.duplicates_detected += 1;
                let count = self.occurrences.entry(existing_hash.clone()).or_insert(1);
                *count += 1;
                let base_score = self.seen.get(&existing_hash).map(|c| c.score).unwrap_or(0.0);
                let boosted = boost_for_occurrences(base_score, *count);
                DedupOutcome::Duplicate {
                    existing_hash,
                    occurrences: *count,
                    boosted_score: boosted,
                }
            }
        }
    }

    /// Process a batch, first collapsing exact-hash duplicates within the
    /// batch itself so an all-identical batch of N doesn't get Jaccard
    /// compared against itself N² times (§4.6).
    pub fn process_batch(&mut self, candidates: Vec<Candidate>) -> Vec<DedupOutcome> {
        let mut within_batch: HashMap<String, usize> = HashMap::new();
        let mut outcomes = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let hash = content_hash(&candidate.title, &candidate.description);
            if let Some(&first_index) = within_batch.get(&hash) {
                // Re-run through process() so occurrence bookkeeping stays
                // centralized, but we already know which hash it'll hit.
                let _ = first_index;
                outcomes.push(self.process(candidate));
            } else {
                within_batch.insert(hash, outcomes.len());
                outcomes.push(self.process(candidate));
            }
        }
        outcomes
    }

    pub fn stats(&self) -> DedupStats {
        DedupStats {
            distinct_hashes: self.seen.len(),
            total_occurrences: self.occurrences.values().map(|&c| c as u64).sum(),
            duplicates_detected: self.duplicates_detected,
            threshold: self.jaccard_threshold,
        }
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_JACCARD_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_under_case_and_whitespace() {
        let a = content_hash("Startup Credit Guide", "  Great resource.  ");
        let b = content_hash("STARTUP   credit guide", "great resource");
        assert_eq!(a, b);
    }

    #[test]
    fn jaccard_identity_and_symmetry() {
        let j_self = jaccard_similarity("a b c", "", "a b c", "");
        assert_eq!(j_self, 1.0);
        let j1 = jaccard_similarity("a b", "c", "b c", "d");
        let j2 = jaccard_similarity("b c", "d", "a b", "c");
        assert_eq!(j1, j2);
    }

    #[test]
    fn jaccard_empty_edge_cases() {
        assert_eq!(jaccard_similarity("", "", "", ""), 1.0);
        assert_eq!(jaccard_similarity("a", "", "", ""), 0.0);
    }

    #[test]
    fn three_identical_hits_converge_to_one_boosted_result() {
        let mut dedup = Deduplicator::default();
        let hit = || Candidate {
            title: "Startup Credit Guide".to_string(),
            description: "How to get credit".to_string(),
            score: 0.60,
        };

        let first = dedup.process(hit());
        let second = dedup.process(hit());
        let third = dedup.process(hit());

        assert!(matches!(first, DedupOutcome::New { .. }));
        match second {
            DedupOutcome::Duplicate { occurrences, boosted_score, .. } => {
                assert_eq!(occurrences, 2);
                assert!(boosted_score <= 0.60 + 0.05 + 1e-9);
            }
            _ => panic!("expected duplicate"),
        }
        match third {
            DedupOutcome::Duplicate { occurrences, boosted_score, .. } => {
                assert_eq!(occurrences, 3);
                assert!(boosted_score <= 0.60 + 0.15 + 1e-9);
                assert!(boosted_score <= 1.0);
            }
            _ => panic!("expected duplicate"),
        }

        let stats = dedup.stats();
        assert_eq!(stats.distinct_hashes, 1);
        assert_eq!(stats.duplicates_detected, 2);
        assert_eq!(stats.total_occurrences, 3);
    }

    #[test]
    fn boost_for_occurrences_is_capped_and_monotonic() {
        assert_eq!(boost_for_occurrences(0.5, 1), 0.5);
        assert!((boost_for_occurrences(0.5, 2) - 0.55).abs() < 1e-9);
        assert!((boost_for_occurrences(0.5, 7) - 0.80).abs() < 1e-9);
        // 10 extra occurrences would be +0.50, but the cap holds at +0.30.
        assert!((boost_for_occurrences(0.5, 11) - 0.80).abs() < 1e-9);
        assert!(boost_for_occurrences(0.95, 20) <= 1.0);
    }
}
