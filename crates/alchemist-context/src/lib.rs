//! Hosted model clients: embeddings and chat completions

pub mod batch;
pub mod chat;
pub mod embedder;

pub use batch::ChunkEmbedder;
pub use chat::OpenAiChat;
pub use embedder::OpenAiEmbedder;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
