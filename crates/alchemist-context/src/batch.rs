use alchemist_config::EmbeddingConfig;
use alchemist_core::error::ApiError;
use alchemist_core::models::{Chunk, EmbeddedChunk};
use alchemist_core::traits::Embedder;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{info, warn};

/// Embeds chunks in fixed-size batches with bounded concurrency
///
/// Output order always matches input order, whatever order the batches
/// complete in.
#[derive(Clone)]
pub struct ChunkEmbedder {
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    concurrency: usize,
}

impl ChunkEmbedder {
    pub fn new(embedder: Arc<dyn Embedder>, batch_size: usize, concurrency: usize) -> Self {
        Self {
            embedder,
            batch_size: batch_size.max(1),
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(embedder: Arc<dyn Embedder>, config: &EmbeddingConfig) -> Self {
        Self::new(embedder, config.batch_size, config.concurrency)
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Embed every chunk, calling `on_batch` with the size of each finished batch
    ///
    /// Chunks with no visible text are skipped since the API rejects empty
    /// input.
    pub async fn embed_chunks<F>(&self, chunks: Vec<Chunk>, on_batch: F) -> Result<Vec<EmbeddedChunk>>
    where
        F: Fn(usize) + Send + Sync,
    {
        let (chunks, blank): (Vec<Chunk>, Vec<Chunk>) =
            chunks.into_iter().partition(|c| !c.text.trim().is_empty());
        for chunk in &blank {
            warn!(chunk_index = chunk.index, "skipping chunk with no text");
        }

        let total_batches = chunks.len().div_ceil(self.batch_size);
        info!(
            chunks = chunks.len(),
            batches = total_batches,
            batch_size = self.batch_size,
            concurrency = self.concurrency,
            model = self.embedder.model(),
            "embedding chunks"
        );

        let batches: Vec<Vec<Chunk>> = chunks
            .chunks(self.batch_size)
            .map(|batch| batch.to_vec())
            .collect();

        let on_batch = &on_batch;
        let embedded: Vec<Vec<EmbeddedChunk>> = stream::iter(batches.into_iter().enumerate())
            .map(|(batch_index, batch)| async move {
                let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
                let vectors = self
                    .embedder
                    .embed_batch(&texts)
                    .await
                    .with_context(|| format!("embedding batch {}/{}", batch_index + 1, total_batches))?;
                let out = self.pair(batch, vectors)?;
                on_batch(out.len());
                Ok::<_, anyhow::Error>(out)
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(embedded.into_iter().flatten().collect())
    }

    fn pair(&self, batch: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<Vec<EmbeddedChunk>> {
        if vectors.len() != batch.len() {
            return Err(ApiError::malformed(
                "OpenAI",
                format!(
                    "Mismatch embedding count: got {}, expected {}",
                    vectors.len(),
                    batch.len()
                ),
            )
            .into());
        }

        let expected = self.embedder.dimensions();
        let model = self.embedder.model().to_string();
        batch
            .into_iter()
            .zip(vectors)
            .map(|(chunk, embedding)| {
                if embedding.len() != expected {
                    return Err(ApiError::DimensionMismatch {
                        expected,
                        actual: embedding.len(),
                    }
                    .into());
                }
                Ok(EmbeddedChunk {
                    chunk,
                    embedding,
                    model: model.clone(),
                })
            })
            .collect()
    }
}
