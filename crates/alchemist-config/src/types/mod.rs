//! Configuration sections, one per pipeline stage

pub mod chunking;
pub mod embedding;
pub mod index;
pub mod llm;
pub mod retrieval;
pub mod retry;

pub use chunking::{ChunkingConfig, TokenizerKind};
pub use embedding::EmbeddingConfig;
pub use index::IndexConfig;
pub use llm::LlmConfig;
pub use retrieval::RetrievalConfig;
pub use retry::RetryConfig;

use serde::{Deserialize, Serialize};

/// Chunking and embedding feed the vector index offline; retrieval and llm
/// drive the online query path. Every section may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Token window and overlap for the sentence chunker
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Embedding provider settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Hosted vector index settings
    #[serde(default)]
    pub index: IndexConfig,

    /// Similarity search parameters
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Answer generation model settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Backoff for calls to hosted APIs
    #[serde(default)]
    pub retry: RetryConfig,
}

impl crate::validation::Validate for Config {
    fn validate(&self) -> crate::error::Result<()> {
        self.chunking.validate()?;
        self.embedding.validate()?;
        self.index.validate()?;
        self.retrieval.validate()?;
        self.llm.validate()?;
        self.retry.validate()
    }
}
