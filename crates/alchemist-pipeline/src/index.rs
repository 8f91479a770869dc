use crate::report::{ChunkStats, IndexReport};
use alchemist_config::Config;
use alchemist_context::{ChunkEmbedder, OpenAiEmbedder};
use alchemist_core::chunking::{counter_for, ChunkParams, Chunker, SentenceChunker};
use alchemist_core::models::VectorRecord;
use alchemist_core::traits::{Embedder, VectorStore};
use alchemist_index::PineconeStore;
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Chunk, embed and upsert one document
pub struct IndexPipeline {
    chunker: Arc<dyn Chunker>,
    embedder: ChunkEmbedder,
    store: Arc<dyn VectorStore>,
}

impl IndexPipeline {
    pub fn new(chunker: Arc<dyn Chunker>, embedder: ChunkEmbedder, store: Arc<dyn VectorStore>) -> Self {
        Self {
            chunker,
            embedder,
            store,
        }
    }

    /// Wire the hosted clients described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let chunker = build_chunker(config)?;
        let embedder: Arc<dyn Embedder> =
            Arc::new(OpenAiEmbedder::from_config(&config.embedding, &config.retry)?);
        let store = Arc::new(PineconeStore::from_config(&config.index, &config.retry)?);
        Ok(Self::new(
            chunker,
            ChunkEmbedder::from_config(embedder, &config.embedding),
            store,
        ))
    }

    pub async fn run(&self, text: &str, document_id: Option<&str>) -> Result<IndexReport> {
        self.run_with_progress(text, document_id, |_| {}, |_| {}).await
    }

    /// Like [`IndexPipeline::run`], reporting the chunk count once known and
    /// the size of each embedded batch
    pub async fn run_with_progress<S, B>(
        &self,
        text: &str,
        document_id: Option<&str>,
        on_chunked: S,
        on_batch: B,
    ) -> Result<IndexReport>
    where
        S: FnOnce(usize),
        B: Fn(usize) + Send + Sync,
    {
        let started = Instant::now();
        let mut report = IndexReport {
            document_id: document_id.map(str::to_string),
            ..Default::default()
        };

        let chunks = self.chunker.chunk(text, document_id)?;
        report.stats = ChunkStats::from_chunks(&chunks);
        report.timings.chunking = started.elapsed();
        info!(
            chunks = report.stats.chunks,
            total_tokens = report.stats.total_tokens,
            "chunking complete"
        );
        on_chunked(chunks.len());

        if chunks.is_empty() {
            warn!("document produced no chunks; nothing to index");
            report.timings.total = started.elapsed();
            return Ok(report);
        }

        let stage = Instant::now();
        let embedded = self.embedder.embed_chunks(chunks, on_batch).await?;
        report.timings.embedding = stage.elapsed();

        if embedded.is_empty() {
            warn!("no chunk had text to embed; nothing to index");
            report.timings.total = started.elapsed();
            return Ok(report);
        }

        let stage = Instant::now();
        let dimension = self.embedder.embedder().dimensions();
        self.store.ensure_index(dimension).await?;
        let records: Vec<VectorRecord> = embedded.into_iter().map(VectorRecord::from).collect();
        report.vectors_upserted = self.store.upsert(&records).await?;
        report.timings.upsert = stage.elapsed();
        report.timings.total = started.elapsed();

        info!(
            vectors = report.vectors_upserted,
            elapsed_ms = report.timings.total.as_millis() as u64,
            "indexing complete"
        );
        Ok(report)
    }
}

/// Sentence chunker with the configured window and tokenizer
pub fn build_chunker(config: &Config) -> Result<Arc<dyn Chunker>> {
    let counter = counter_for(config.chunking.tokenizer)?;
    let chunker = SentenceChunker::new(ChunkParams::from(&config.chunking), counter)?;
    Ok(Arc::new(chunker))
}
