use crate::{API_KEY_VAR, DEFAULT_API_BASE};
use alchemist_config::{EmbeddingConfig, RetryConfig};
use alchemist_core::error::ApiError;
use alchemist_core::http::{self, read_json, transport_error};
use alchemist_core::retry::RetryPolicy;
use alchemist_core::traits::Embedder;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const SERVICE: &str = "OpenAI";

/// OpenAI embeddings endpoint
///
/// Requests vectors of a fixed length via the `dimensions` parameter and
/// rejects any response that does not match it.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    model: String,
    dimensions: usize,
    api_key: String,
    api_base: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl OpenAiEmbedder {
    pub fn new(
        model: String,
        dimensions: usize,
        api_key: String,
        api_base: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            model,
            dimensions,
            api_key,
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            client: http::client(timeout_secs)?,
            retry: RetryPolicy::none(),
        })
    }

    /// Build from configuration, reading the key from `OPENAI_API_KEY`
    pub fn from_config(config: &EmbeddingConfig, retry: &RetryConfig) -> Result<Self> {
        let embedder = Self::new(
            config.model.clone(),
            config.dimensions,
            http::api_key(API_KEY_VAR)?,
            config.api_base.clone(),
            config.timeout_secs,
        )?;
        Ok(embedder.with_retry(RetryPolicy::from(retry)))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn request(&self, body: &Value, expected: usize) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.api_base.trim_end_matches('/'));
        let res = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;
        let json = read_json(SERVICE, res).await?;
        parse_embeddings(json, expected, self.dimensions)
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut list = self.embed_batch(&[text.to_string()]).await?;
        list.pop().ok_or_else(|| anyhow!("Empty embedding response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(count = texts.len(), model = %self.model, "embedding batch");
        let body = embedding_request(&self.model, texts, self.dimensions);
        self.retry
            .run("embeddings", || self.request(&body, texts.len()))
            .await
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

pub fn embedding_request(model: &str, texts: &[String], dimensions: usize) -> Value {
    serde_json::json!({
        "model": model,
        "input": texts,
        "dimensions": dimensions,
    })
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

/// Extract vectors from an embeddings response, in input order
pub fn parse_embeddings(json: Value, expected: usize, dimensions: usize) -> Result<Vec<Vec<f32>>> {
    let mut parsed: EmbeddingResponse =
        serde_json::from_value(json).map_err(|e| ApiError::malformed(SERVICE, e.to_string()))?;

    if parsed.data.len() != expected {
        return Err(ApiError::malformed(
            SERVICE,
            format!(
                "Mismatch embedding count: got {}, expected {}",
                parsed.data.len(),
                expected
            ),
        )
        .into());
    }

    if parsed.data.iter().all(|item| item.index.is_some()) {
        parsed.data.sort_by_key(|item| item.index);
    }

    parsed
        .data
        .into_iter()
        .map(|item| {
            if item.embedding.len() == dimensions {
                Ok(item.embedding)
            } else {
                Err(ApiError::DimensionMismatch {
                    expected: dimensions,
                    actual: item.embedding.len(),
                }
                .into())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_body() {
        let body = embedding_request(
            "text-embedding-3-large",
            &["one".to_string(), "two".to_string()],
            3072,
        );
        assert_eq!(
            body,
            json!({
                "model": "text-embedding-3-large",
                "input": ["one", "two"],
                "dimensions": 3072,
            })
        );
    }

    #[test]
    fn test_parse_restores_input_order() {
        let json = json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] },
            ],
            "model": "text-embedding-3-large",
        });
        let vectors = parse_embeddings(json, 2, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_parse_rejects_wrong_count() {
        let json = json!({ "data": [{ "index": 0, "embedding": [1.0] }] });
        let err = parse_embeddings(json, 2, 1).unwrap_err();
        assert!(err.to_string().contains("got 1, expected 2"));
    }

    #[test]
    fn test_parse_rejects_wrong_dimensions() {
        let json = json!({ "data": [{ "index": 0, "embedding": [1.0, 2.0, 3.0] }] });
        let err = parse_embeddings(json, 1, 4).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ApiError>(),
            Some(&ApiError::DimensionMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let err = parse_embeddings(json!({ "object": "list" }), 1, 1).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::MalformedResponse { .. })
        ));
    }
}
