use crate::models::RetrievedChunk;
use serde::{Deserialize, Serialize};

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant that answers questions based on \
provided context. Your answers should be accurate, concise, and directly address the user's \
question. Always cite your sources using [Source N] notation when referencing specific \
information. If the context doesn't contain enough information to answer the question, say so \
clearly and explain what information is missing.";

pub const NO_CONTEXT: &str = "No relevant context found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Render retrieved chunks as numbered sources, best match first
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    if chunks.is_empty() {
        return NO_CONTEXT.to_string();
    }
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[Source {}]\n{}\n", i + 1, chunk.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn user_message(query: &str, context: &str) -> String {
    format!(
        "Context:\n{context}\n\nQuestion: {query}\n\n\
         Please answer the question based on the context provided above. \
         Cite your sources using [Source N] notation."
    )
}

/// System and user messages for answering `query` from `chunks`
pub fn build_messages(query: &str, chunks: &[RetrievedChunk]) -> Vec<Message> {
    vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(user_message(query, &build_context(chunks))),
    ]
}
