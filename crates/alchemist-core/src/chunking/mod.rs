//! Token-windowed sentence chunking with overlap

pub mod error;
pub mod packer;
pub mod params;
pub mod segmenter;
pub mod sink;
pub mod tokenizer;

pub use error::ChunkingError;
pub use packer::SentenceChunker;
pub use params::ChunkParams;
pub use segmenter::{Sentence, SentenceSegmenter};
pub use sink::{BoundaryEvent, BoundarySink, TracingSink};
pub use tokenizer::{counter_for, Cl100kCounter, TokenCounter, WordCounter};

use crate::models::Chunk;

/// Splits one document into ordered chunks
pub trait Chunker: Send + Sync {
    fn chunk(&self, text: &str, document_id: Option<&str>) -> Result<Vec<Chunk>, ChunkingError>;
}
