use crate::prompt::Message;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Boundary conditions a chunk was produced under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCondition {
    OversizedSentence,
    ShortTrailingChunk,
    UndersizedChunk,
    InsufficientOverlap,
    OverlapTrimmed,
}

/// A token-bounded window of a document, the unit handed to embedding.
///
/// Chunks are contiguous spans of the source: `text` is exactly
/// `source[start_byte..end_byte]`, leading overlap included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub text: String,
    pub token_count: usize,
    /// Tokens at the start of `text` repeated from the previous chunk
    pub overlap_token_count: usize,
    pub start_byte: usize,
    pub end_byte: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub boundary: Vec<BoundaryCondition>,
}

impl Chunk {
    /// Stable vector id derived from the document id and chunk index
    pub fn vector_id(&self) -> String {
        vector_id(self.document_id.as_deref(), self.index)
    }

    pub fn has_condition(&self, condition: BoundaryCondition) -> bool {
        self.boundary.contains(&condition)
    }
}

/// Vector id for chunk `index` of a document.
///
/// Re-indexing the same document overwrites its vectors in place.
pub fn vector_id(document_id: Option<&str>, index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_id.unwrap_or("doc").as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}-{:05}", &digest[..16], index)
}

/// A chunk paired with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
    pub model: String,
}

impl EmbeddedChunk {
    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }
}

/// Record written to the vector index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// Metadata stored next to each vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub chunk_index: usize,
    pub text: String,
    pub token_count: usize,
    pub overlap_token_count: usize,
    pub start_byte: usize,
    pub end_byte: usize,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl From<EmbeddedChunk> for VectorRecord {
    fn from(embedded: EmbeddedChunk) -> Self {
        let EmbeddedChunk {
            chunk,
            embedding,
            model,
        } = embedded;
        Self {
            id: chunk.vector_id(),
            values: embedding,
            metadata: ChunkMetadata {
                chunk_index: chunk.index,
                text: chunk.text,
                token_count: chunk.token_count,
                overlap_token_count: chunk.overlap_token_count,
                start_byte: chunk.start_byte,
                end_byte: chunk.end_byte,
                model,
                source: chunk.document_id,
            },
        }
    }
}

/// Raw match returned by a similarity query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// A retrieved chunk that passed the score filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub id: String,
    pub text: String,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Vector index statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub dimension: usize,
    pub total_vector_count: u64,
    pub namespaces: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Answer produced from a query and its retrieved context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    pub answer: String,
    /// Ids of the chunks given to the model, in `[Source N]` order
    pub sources: Vec<String>,
    pub model: String,
    pub usage: TokenUsage,
}

/// Request for one chat completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}
