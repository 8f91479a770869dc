use alchemist_config::RetrievalConfig;
use alchemist_core::error::ApiError;
use alchemist_core::models::{RetrievedChunk, ScoredMatch};
use alchemist_core::traits::VectorStore;
use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Top-k similarity search with a minimum score
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    dimensions: usize,
    top_k: usize,
    min_score: f32,
}

impl Retriever {
    pub fn new(store: Arc<dyn VectorStore>, dimensions: usize, top_k: usize, min_score: f32) -> Self {
        Self {
            store,
            dimensions,
            top_k,
            min_score,
        }
    }

    pub fn from_config(store: Arc<dyn VectorStore>, dimensions: usize, config: &RetrievalConfig) -> Self {
        Self::new(store, dimensions, config.top_k, config.min_score)
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn min_score(&self) -> f32 {
        self.min_score
    }

    /// Retrieve with the configured `top_k` and `min_score`
    pub async fn retrieve(&self, vector: &[f32]) -> Result<Vec<RetrievedChunk>> {
        self.retrieve_with(vector, self.top_k, self.min_score).await
    }

    pub async fn retrieve_with(
        &self,
        vector: &[f32],
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<RetrievedChunk>> {
        if vector.is_empty() {
            bail!("query vector is empty");
        }
        if vector.len() != self.dimensions {
            return Err(ApiError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            }
            .into());
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let matches = self.store.query(vector, top_k).await?;
        let total = matches.len();
        let kept = filter_matches(matches, min_score);
        debug!(top_k, min_score, returned = total, kept = kept.len(), "retrieved matches");
        Ok(kept)
    }
}

/// Keep matches scoring at least `min_score` that carry text, best first
pub fn filter_matches(matches: Vec<ScoredMatch>, min_score: f32) -> Vec<RetrievedChunk> {
    let mut kept: Vec<RetrievedChunk> = matches
        .into_iter()
        .filter(|m| m.score >= min_score)
        .filter_map(|m| {
            let Some(text) = m.metadata.get("text").and_then(|v| v.as_str()) else {
                warn!(id = %m.id, "match has no text metadata; skipping");
                return None;
            };
            Some(RetrievedChunk {
                text: text.to_string(),
                chunk_index: m
                    .metadata
                    .get("chunk_index")
                    .and_then(|v| v.as_u64())
                    .map(|i| i as usize),
                source: m
                    .metadata
                    .get("source")
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
                score: m.score,
                id: m.id,
            })
        })
        .collect();
    kept.sort_by(|a, b| b.score.total_cmp(&a.score));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scored(id: &str, score: f32, metadata: serde_json::Value) -> ScoredMatch {
        ScoredMatch {
            id: id.to_string(),
            score,
            metadata: metadata.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_filter_and_sort() {
        let matches = vec![
            scored("low", 0.5, json!({ "text": "weak" })),
            scored("mid", 0.75, json!({ "text": "okay", "chunk_index": 3 })),
            scored("top", 0.9, json!({ "text": "best", "source": "a.txt" })),
            scored("edge", 0.7, json!({ "text": "boundary" })),
        ];
        let kept = filter_matches(matches, 0.7);
        let ids: Vec<&str> = kept.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["top", "mid", "edge"]);
        assert_eq!(kept[0].source.as_deref(), Some("a.txt"));
        assert_eq!(kept[1].chunk_index, Some(3));
    }

    #[test]
    fn test_missing_text_skipped() {
        let kept = filter_matches(vec![scored("bare", 0.99, json!({}))], 0.0);
        assert!(kept.is_empty());
    }
}
