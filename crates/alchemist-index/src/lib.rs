//! Vector index access: the Pinecone REST client and score-filtered retrieval

pub mod pinecone;
pub mod retriever;

pub use pinecone::PineconeStore;
pub use retriever::Retriever;
