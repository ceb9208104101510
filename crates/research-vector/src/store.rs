//! In-memory vector store (§4.4): four named collections, linear scan,
//! Euclidean distance converted to a `1/(1+distance)` similarity score.

use std::collections::HashMap;
use std::sync::RwLock;

use research_core::models::VectorCollectionKind;
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct VectorMatch {
    pub id: String,
    pub similarity: f64,
    pub metadata: HashMap<String, Value>,
    pub text: Option<String>,
}

struct Entry {
    id: String,
    vector: Vec<f32>,
    metadata: HashMap<String, Value>,
    text: Option<String>,
}

#[derive(Default)]
struct Collection {
    entries: Vec<Entry>,
}

impl Collection {
    fn add(&mut self, ids: Vec<String>, vectors: Vec<Vec<f32>>, metadatas: Vec<HashMap<String, Value>>, texts: Vec<Option<String>>) {
        for (((id, vector), metadata), text) in ids.into_iter().zip(vectors).zip(metadatas).zip(texts) {
            self.entries.retain(|e| e.id != id);
            self.entries.push(Entry { id, vector, metadata, text });
        }
    }

    fn query(&self, vector: &[f32], k: usize, filter: Option<(&str, &Value)>) -> Vec<VectorMatch> {
        let mut scored: Vec<(f64, &Entry)> = self
            .entries
            .iter()
            .filter(|e| match filter {
                Some((key, value)) => e.metadata.get(key) == Some(value),
                None => true,
            })
            .map(|e| (euclidean_distance(vector, &e.vector), e))
            .collect();

        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(k)
            .map(|(distance, entry)| VectorMatch {
                id: entry.id.clone(),
                similarity: 1.0 / (1.0 + distance),
                metadata: entry.metadata.clone(),
                text: entry.text.clone(),
            })
            .collect()
    }

    fn count(&self) -> usize {
        self.entries.len()
    }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| ((*x - *y) as f64).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Process singleton held as an explicit `Arc`, never a module-level global.
pub struct VectorStore {
    results: RwLock<Collection>,
    failures: RwLock<Collection>,
    queries: RwLock<Collection>,
    documents: RwLock<Collection>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self {
            results: RwLock::new(Collection::default()),
            failures: RwLock::new(Collection::default()),
            queries: RwLock::new(Collection::default()),
            documents: RwLock::new(Collection::default()),
        }
    }

    fn collection(&self, kind: VectorCollectionKind) -> &RwLock<Collection> {
        match kind {
            VectorCollectionKind::Results => &self.results,
            VectorCollectionKind::Failures => &self.failures,
            VectorCollectionKind::Queries => &self.queries,
            VectorCollectionKind::Documents => &self.documents,
        }
    }

    pub fn add(
        &self,
        kind: VectorCollectionKind,
        ids: Vec<String>,
        vectors: Vec<Vec<f32>>,
        metadatas: Vec<HashMap<String, Value>>,
        texts: Vec<Option<String>>,
    ) {
        self.collection(kind).write().unwrap().add(ids, vectors, metadatas, texts);
    }

    pub fn query(&self, kind: VectorCollectionKind, vector: &[f32], k: usize) -> Vec<VectorMatch> {
        self.collection(kind).read().unwrap().query(vector, k, None)
    }

    /// Query restricted to entries whose metadata has `failure_id == failure_id`.
    pub fn query_by_failure(
        &self,
        kind: VectorCollectionKind,
        vector: &[f32],
        k: usize,
        failure_id: i64,
    ) -> Vec<VectorMatch> {
        let value = Value::from(failure_id);
        self.collection(kind).read().unwrap().query(vector, k, Some(("failure_id", &value)))
    }

    pub fn count(&self, kind: VectorCollectionKind) -> usize {
        self.collection(kind).read().unwrap().count()
    }
}

impl Default for VectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(failure_id: i64) -> HashMap<String, Value> {
        let mut m = HashMap::new();
        m.insert("failure_id".to_string(), Value::from(failure_id));
        m
    }

    #[test]
    fn query_returns_closest_vectors_first() {
        let store = VectorStore::new();
        store.add(
            VectorCollectionKind::Results,
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![5.0, 5.0]],
            vec![meta(1), meta(1), meta(2)],
            vec![None, None, None],
        );

        let matches = store.query(VectorCollectionKind::Results, &[0.0, 0.0], 2);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "a");
        assert_eq!(matches[1].id, "b");
        assert!(matches[0].similarity > matches[1].similarity);
    }

    #[test]
    fn query_by_failure_filters_other_failures_out() {
        let store = VectorStore::new();
        store.add(
            VectorCollectionKind::Failures,
            vec!["a".to_string(), "b".to_string()],
            vec![vec![0.0, 0.0], vec![0.1, 0.1]],
            vec![meta(1), meta(2)],
            vec![None, None],
        );

        let matches = store.query_by_failure(VectorCollectionKind::Failures, &[0.0, 0.0], 5, 2);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "b");
    }

    #[test]
    fn collections_are_isolated() {
        let store = VectorStore::new();
        store.add(
            VectorCollectionKind::Queries,
            vec!["q1".to_string()],
            vec![vec![1.0]],
            vec![meta(1)],
            vec![None],
        );
        assert_eq!(store.count(VectorCollectionKind::Queries), 1);
        assert_eq!(store.count(VectorCollectionKind::Results), 0);
    }

    #[test]
    fn re_adding_same_id_replaces_entry() {
        let store = VectorStore::new();
        store.add(
            VectorCollectionKind::Documents,
            vec!["d1".to_string()],
            vec![vec![1.0, 1.0]],
            vec![meta(1)],
            vec![Some("first".to_string())],
        );
        store.add(
            VectorCollectionKind::Documents,
            vec!["d1".to_string()],
            vec![vec![2.0, 2.0]],
            vec![meta(1)],
            vec![Some("second".to_string())],
        );
        assert_eq!(store.count(VectorCollectionKind::Documents), 1);
        let matches = store.query(VectorCollectionKind::Documents, &[2.0, 2.0], 1);
        assert_eq!(matches[0].text.as_deref(), Some("second"));
    }
}
