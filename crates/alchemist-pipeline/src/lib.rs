//! Offline indexing and online question answering

pub mod index;
pub mod query;
pub mod report;

pub use index::IndexPipeline;
pub use query::{QueryOptions, QueryOutcome, QueryPipeline};
pub use report::{ChunkStats, IndexReport};
