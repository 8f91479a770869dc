use crate::models::{ChatCompletion, ChatRequest, IndexStats, ScoredMatch, VectorRecord};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn model(&self) -> &str;

    /// Length of every vector this embedder returns
    fn dimensions(&self) -> usize;
}

/// Similarity index holding chunk vectors and their metadata
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the index if missing; fails if it exists with another dimension
    async fn ensure_index(&self, dimension: usize) -> Result<()>;

    /// Insert or overwrite records by id, returning how many were written
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize>;

    /// Nearest neighbours of `vector`, best first
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredMatch>>;

    async fn stats(&self) -> Result<IndexStats>;
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion>;

    fn model(&self) -> &str;
}
