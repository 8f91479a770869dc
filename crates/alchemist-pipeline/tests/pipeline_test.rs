use alchemist_config::LlmConfig;
use alchemist_context::ChunkEmbedder;
use alchemist_core::chunking::{ChunkParams, SentenceChunker, WordCounter};
use alchemist_core::models::{
    ChatCompletion, ChatRequest, IndexStats, ScoredMatch, TokenUsage, VectorRecord,
};
use alchemist_core::query::QueryError;
use alchemist_core::traits::{ChatModel, Embedder, VectorStore};
use alchemist_index::Retriever;
use alchemist_pipeline::{IndexPipeline, QueryOptions, QueryPipeline};
use anyhow::Result;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const KEYWORDS: [&str; 3] = ["gold", "lead", "mercury"];

/// Bag-of-keywords vectors so similarity is predictable
#[derive(Default)]
struct MockEmbedder {
    calls: AtomicUsize,
}

fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let mut v: Vec<f32> = KEYWORDS
        .iter()
        .map(|k| lower.matches(k).count() as f32)
        .collect();
    v.push(0.1);
    v
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(keyword_vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }

    fn model(&self) -> &str {
        "mock-embedding"
    }

    fn dimensions(&self) -> usize {
        KEYWORDS.len() + 1
    }
}

#[derive(Default)]
struct MemoryStore {
    records: Mutex<Vec<VectorRecord>>,
    ensured: Mutex<Vec<usize>>,
    queries: Mutex<Vec<usize>>,
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm = |v: &[f32]| v.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (norm(a) * norm(b))
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn ensure_index(&self, dimension: usize) -> Result<()> {
        self.ensured.lock().unwrap().push(dimension);
        Ok(())
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        let mut stored = self.records.lock().unwrap();
        for record in records {
            stored.retain(|r| r.id != record.id);
            stored.push(record.clone());
        }
        Ok(records.len())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredMatch>> {
        self.queries.lock().unwrap().push(top_k);
        let mut matches: Vec<ScoredMatch> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .map(|r| ScoredMatch {
                id: r.id.clone(),
                score: cosine(vector, &r.values),
                metadata: serde_json::to_value(&r.metadata)
                    .unwrap()
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn stats(&self) -> Result<IndexStats> {
        Ok(IndexStats {
            dimension: KEYWORDS.len() + 1,
            total_vector_count: self.records.lock().unwrap().len() as u64,
            ..Default::default()
        })
    }
}

#[derive(Default)]
struct MockChat {
    requests: Mutex<Vec<ChatRequest>>,
}

#[async_trait]
impl ChatModel for MockChat {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(ChatCompletion {
            content: "Lead becomes gold [Source 1].".to_string(),
            model: "mock-chat".to_string(),
            usage: TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 7,
                total_tokens: 107,
            },
        })
    }

    fn model(&self) -> &str {
        "mock-chat"
    }
}

const DOCUMENT: &str = "The alchemist heated the lead for seven days. \
    Smoke rose from the furnace and filled the room. \
    Mercury was added to the crucible at dawn. \
    The apprentice recorded every change in a ledger. \
    At last the lead turned to gold and the gold shone. \
    Nobody in the village believed the story.";

struct Harness {
    embedder: Arc<MockEmbedder>,
    store: Arc<MemoryStore>,
    chat: Arc<MockChat>,
}

impl Harness {
    fn new() -> Self {
        Self {
            embedder: Arc::new(MockEmbedder::default()),
            store: Arc::new(MemoryStore::default()),
            chat: Arc::new(MockChat::default()),
        }
    }

    fn index_pipeline(&self) -> Result<IndexPipeline> {
        let chunker = SentenceChunker::new(ChunkParams::new(12, 20, 2, 9), Arc::new(WordCounter))?;
        Ok(IndexPipeline::new(
            Arc::new(chunker),
            ChunkEmbedder::new(self.embedder.clone(), 2, 2),
            self.store.clone(),
        ))
    }

    fn query_pipeline(&self, min_score: f32) -> QueryPipeline {
        let retriever = Retriever::new(self.store.clone(), KEYWORDS.len() + 1, 3, min_score);
        QueryPipeline::new(
            self.embedder.clone(),
            retriever,
            self.chat.clone(),
            &LlmConfig::default(),
        )
    }
}

#[tokio::test]
async fn test_index_document() -> Result<()> {
    let harness = Harness::new();
    let report = harness
        .index_pipeline()?
        .run(DOCUMENT, Some("alchemy.txt"))
        .await?;

    assert!(report.stats.chunks >= 2);
    assert_eq!(report.vectors_upserted, report.stats.chunks);
    assert!(report.stats.max_tokens <= 20);
    assert_eq!(report.document_id.as_deref(), Some("alchemy.txt"));
    assert_eq!(harness.store.ensured.lock().unwrap().as_slice(), &[4]);

    let records = harness.store.records.lock().unwrap();
    assert_eq!(records.len(), report.stats.chunks);
    assert!(records
        .iter()
        .all(|r| r.metadata.source.as_deref() == Some("alchemy.txt")));
    assert!(records.iter().all(|r| r.metadata.model == "mock-embedding"));
    Ok(())
}

#[tokio::test]
async fn test_reindexing_overwrites() -> Result<()> {
    let harness = Harness::new();
    let pipeline = harness.index_pipeline()?;
    let first = pipeline.run(DOCUMENT, Some("alchemy.txt")).await?;
    pipeline.run(DOCUMENT, Some("alchemy.txt")).await?;

    let stats = harness.store.stats().await?;
    assert_eq!(stats.total_vector_count, first.stats.chunks as u64);
    Ok(())
}

#[tokio::test]
async fn test_empty_document_makes_no_calls() -> Result<()> {
    let harness = Harness::new();
    let report = harness.index_pipeline()?.run("", None).await?;

    assert_eq!(report.stats.chunks, 0);
    assert_eq!(report.vectors_upserted, 0);
    assert_eq!(harness.embedder.calls.load(Ordering::SeqCst), 0);
    assert!(harness.store.ensured.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_progress_callbacks() -> Result<()> {
    let harness = Harness::new();
    let chunked = AtomicUsize::new(0);
    let embedded = AtomicUsize::new(0);
    let report = harness
        .index_pipeline()?
        .run_with_progress(
            DOCUMENT,
            None,
            |n| chunked.store(n, Ordering::SeqCst),
            |n| {
                embedded.fetch_add(n, Ordering::SeqCst);
            },
        )
        .await?;

    assert_eq!(chunked.load(Ordering::SeqCst), report.stats.chunks);
    assert_eq!(embedded.load(Ordering::SeqCst), report.stats.chunks);
    Ok(())
}

#[tokio::test]
async fn test_query_answers_with_sources() -> Result<()> {
    let harness = Harness::new();
    harness
        .index_pipeline()?
        .run(DOCUMENT, Some("alchemy.txt"))
        .await?;

    let outcome = harness
        .query_pipeline(0.0)
        .run("  How did   lead become gold? ", &QueryOptions::default())
        .await?;

    assert_eq!(outcome.query, "How did lead become gold?");
    assert!(!outcome.chunks.is_empty());
    assert!(outcome.chunks[0].text.contains("gold"));
    assert_eq!(
        outcome.answer.sources,
        outcome.chunks.iter().map(|c| c.id.clone()).collect::<Vec<_>>()
    );
    assert_eq!(outcome.answer.usage.total_tokens, 107);
    assert!(outcome.timings.total >= outcome.timings.generation);

    let requests = harness.chat.requests.lock().unwrap();
    let user = &requests[0].messages[1].content;
    assert!(user.starts_with("Context:\n[Source 1]\n"));
    assert!(user.contains("Question: How did lead become gold?"));
    assert_eq!(requests[0].temperature, Some(0.7));
    Ok(())
}

#[tokio::test]
async fn test_query_options_override_defaults() -> Result<()> {
    let harness = Harness::new();
    harness.index_pipeline()?.run(DOCUMENT, None).await?;

    let options = QueryOptions {
        top_k: Some(1),
        min_score: Some(0.0),
        temperature: Some(0.2),
        max_tokens: Some(64),
    };
    let outcome = harness.query_pipeline(0.99).run("gold", &options).await?;

    assert_eq!(outcome.chunks.len(), 1);
    assert_eq!(harness.store.queries.lock().unwrap().as_slice(), &[1]);
    let requests = harness.chat.requests.lock().unwrap();
    assert_eq!(requests[0].temperature, Some(0.2));
    assert_eq!(requests[0].max_tokens, Some(64));
    Ok(())
}

#[tokio::test]
async fn test_no_context_still_answers() -> Result<()> {
    let harness = Harness::new();
    let outcome = harness
        .query_pipeline(0.7)
        .run("What is the philosopher's stone?", &QueryOptions::default())
        .await?;

    assert!(outcome.chunks.is_empty());
    assert!(outcome.answer.sources.is_empty());
    let requests = harness.chat.requests.lock().unwrap();
    assert!(requests[0].messages[1]
        .content
        .contains("No relevant context found."));
    Ok(())
}

#[tokio::test]
async fn test_empty_query_rejected_before_network() {
    let harness = Harness::new();
    let err = harness
        .query_pipeline(0.7)
        .run("   ", &QueryOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.downcast_ref::<QueryError>(), Some(&QueryError::Empty));
    assert_eq!(harness.embedder.calls.load(Ordering::SeqCst), 0);
    assert!(harness.chat.requests.lock().unwrap().is_empty());
}
