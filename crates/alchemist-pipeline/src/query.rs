use alchemist_config::{Config, LlmConfig};
use alchemist_context::{OpenAiChat, OpenAiEmbedder};
use alchemist_core::models::{ChatRequest, GeneratedAnswer, RetrievedChunk};
use alchemist_core::prompt::build_messages;
use alchemist_core::query::preprocess_query;
use alchemist_core::traits::{ChatModel, Embedder, VectorStore};
use alchemist_index::{PineconeStore, Retriever};
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Per-query overrides of the configured defaults
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QueryOptions {
    pub top_k: Option<usize>,
    pub min_score: Option<f32>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct QueryTimings {
    pub embedding: Duration,
    pub retrieval: Duration,
    pub generation: Duration,
    pub total: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    /// The query as sent to the embedder, after normalisation
    pub query: String,
    pub answer: GeneratedAnswer,
    pub chunks: Vec<RetrievedChunk>,
    pub timings: QueryTimings,
}

/// Embed a question, retrieve context and generate a cited answer
pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    retriever: Retriever,
    chat: Arc<dyn ChatModel>,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl QueryPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        retriever: Retriever,
        chat: Arc<dyn ChatModel>,
        llm: &LlmConfig,
    ) -> Self {
        Self {
            embedder,
            retriever,
            chat,
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder: Arc<dyn Embedder> =
            Arc::new(OpenAiEmbedder::from_config(&config.embedding, &config.retry)?);
        let store: Arc<dyn VectorStore> =
            Arc::new(PineconeStore::from_config(&config.index, &config.retry)?);
        let retriever = Retriever::from_config(store, config.embedding.dimensions, &config.retrieval);
        let chat: Arc<dyn ChatModel> = Arc::new(OpenAiChat::from_config(&config.llm, &config.retry)?);
        Ok(Self::new(embedder, retriever, chat, &config.llm))
    }

    pub fn model(&self) -> &str {
        self.chat.model()
    }

    pub async fn run(&self, query: &str, options: &QueryOptions) -> Result<QueryOutcome> {
        let started = Instant::now();
        let query = preprocess_query(query)?;
        let mut timings = QueryTimings::default();

        let stage = Instant::now();
        let vector = self.embedder.embed(&query).await?;
        timings.embedding = stage.elapsed();

        let stage = Instant::now();
        let chunks = self
            .retriever
            .retrieve_with(
                &vector,
                options.top_k.unwrap_or(self.retriever.top_k()),
                options.min_score.unwrap_or(self.retriever.min_score()),
            )
            .await?;
        timings.retrieval = stage.elapsed();
        info!(retrieved = chunks.len(), "retrieval complete");

        let stage = Instant::now();
        let request = ChatRequest {
            messages: build_messages(&query, &chunks),
            temperature: Some(options.temperature.unwrap_or(self.temperature)),
            max_tokens: options.max_tokens.or(self.max_tokens),
        };
        let completion = self.chat.complete(&request).await?;
        timings.generation = stage.elapsed();
        timings.total = started.elapsed();

        info!(
            model = %completion.model,
            completion_tokens = completion.usage.completion_tokens,
            elapsed_ms = timings.total.as_millis() as u64,
            "generated answer"
        );

        Ok(QueryOutcome {
            answer: GeneratedAnswer {
                answer: completion.content,
                sources: chunks.iter().map(|c| c.id.clone()).collect(),
                model: completion.model,
                usage: completion.usage,
            },
            query,
            chunks,
            timings,
        })
    }
}
