//! Embedding client (§4.3): truncates long inputs, short-circuits empty
//! input to a zero vector, caches by raw text, and falls back to a zero
//! vector on any API failure rather than propagating the error.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

const TRUNCATE_CHARS: usize = 8000;
const DEFAULT_BATCH_SIZE: usize = 20;
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub struct EmbeddingService {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dim: usize,
    cache: Mutex<HashMap<String, Vec<f32>>>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingService {
    pub fn new(base_url: String, api_key: String, model: String, dim: usize) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("reqwest client builds"),
            base_url,
            api_key,
            model,
            dim,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Builds from app config, defaulting to the public OpenAI endpoint
    /// (the source system has no separate embedding-provider setting,
    /// only a model name and an OpenAI key).
    pub fn from_settings(settings: &research_core::config::Settings) -> Self {
        Self::new(
            OPENAI_BASE_URL.to_string(),
            settings.openai_api_key.clone().unwrap_or_default(),
            settings.embedding_model.clone(),
            settings.embedding_dim,
        )
    }

    fn zero_vector(&self) -> Vec<f32> {
        vec![0.0; self.dim]
    }

    pub async fn embed(&self, text: &str) -> Vec<f32> {
        if text.trim().is_empty() {
            return self.zero_vector();
        }

        if let Some(cached) = self.cache.lock().unwrap().get(text) {
            return cached.clone();
        }

        let truncated: String = text.chars().take(TRUNCATE_CHARS).collect();

        match self.call(&truncated).await {
            Ok(vector) => {
                self.cache.lock().unwrap().insert(text.to_string(), vector.clone());
                vector
            }
            Err(err) => {
                tracing::warn!(error = %err, "embedding API call failed, returning zero vector");
                self.zero_vector()
            }
        }
    }

    async fn call(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest { input: text, model: &self.model };
        let response = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let parsed: EmbeddingResponse = response.json().await?;
        Ok(parsed.data.into_iter().next().map(|d| d.embedding).unwrap_or_else(|| vec![0.0; self.dim]))
    }

    /// Embed many texts in groups of `batch_size`, with bounded
    /// in-group parallelism (§4.3, default B=20).
    pub async fn embed_batch(self: &std::sync::Arc<Self>, texts: &[String]) -> Vec<Vec<f32>> {
        self.embed_batch_sized(texts, DEFAULT_BATCH_SIZE).await
    }

    pub async fn embed_batch_sized(self: &std::sync::Arc<Self>, texts: &[String], batch_size: usize) -> Vec<Vec<f32>> {
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(batch_size.max(1)) {
            let mut handles = Vec::with_capacity(chunk.len());
            for text in chunk {
                let service = self.clone();
                let text = text.clone();
                handles.push(tokio::spawn(async move { service.embed(&text).await }));
            }
            for handle in handles {
                out.push(handle.await.unwrap_or_else(|_| vec![0.0; self.dim]));
            }
        }
        out
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn clear_cache(&self) {
        self.cache.lock().unwrap().clear();
    }
}

#[async_trait::async_trait]
impl research_core::services::EmbeddingBackend for EmbeddingService {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(EmbeddingService::embed(self, text).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_text_short_circuits_without_network() {
        let service = EmbeddingService::new(
            "http://127.0.0.1:0".to_string(),
            "key".to_string(),
            "text-embedding-3-small".to_string(),
            1536,
        );
        let vector = service.embed("   ").await;
        assert_eq!(vector, vec![0.0; 1536]);
    }

    #[tokio::test]
    async fn failed_call_returns_zero_vector() {
        let service = EmbeddingService::new(
            "http://127.0.0.1:0".to_string(),
            "key".to_string(),
            "text-embedding-3-small".to_string(),
            8,
        );
        let vector = service.embed("credit access for smallholder farmers").await;
        assert_eq!(vector, vec![0.0; 8]);
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let service = EmbeddingService::new(
            "http://127.0.0.1:0".to_string(),
            "key".to_string(),
            "text-embedding-3-small".to_string(),
            4,
        );
        let _ = service.embed("same text").await;
        assert_eq!(service.cache_len(), 0, "failed calls must not populate the cache");
    }
}
