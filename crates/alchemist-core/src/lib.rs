pub mod chunking;
pub mod error;
pub mod http;
pub mod models;
pub mod prompt;
pub mod query;
pub mod retry;
pub mod traits;

pub use chunking::{
    counter_for, BoundaryEvent, BoundarySink, ChunkParams, Chunker, ChunkingError,
    SentenceChunker, TokenCounter,
};
pub use error::ApiError;
pub use models::{BoundaryCondition, Chunk, EmbeddedChunk, RetrievedChunk, VectorRecord};
pub use query::{preprocess_query, QueryError};
pub use retry::RetryPolicy;
