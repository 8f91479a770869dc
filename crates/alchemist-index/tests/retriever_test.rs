use alchemist_core::error::ApiError;
use alchemist_core::models::{IndexStats, ScoredMatch, VectorRecord};
use alchemist_core::traits::VectorStore;
use alchemist_index::Retriever;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Brute-force cosine store
#[derive(Default)]
struct MemoryStore {
    records: Mutex<Vec<VectorRecord>>,
    queries: Mutex<Vec<usize>>,
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm = |v: &[f32]| v.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (norm(a) * norm(b))
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn ensure_index(&self, _dimension: usize) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        self.records.lock().unwrap().extend_from_slice(records);
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
            dimension: 2,
            total_vector_count: self.records.lock().unwrap().len() as u64,
            ..Default::default()
        })
    }
}

fn record(id: &str, values: [f32; 2], text: &str) -> VectorRecord {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "values": values,
        "metadata": {
            "chunk_index": 0,
            "text": text,
            "token_count": 1,
            "overlap_token_count": 0,
            "start_byte": 0,
            "end_byte": text.len(),
            "model": "mock",
            "source": "memory",
        },
    }))
    .unwrap()
}

async fn seeded() -> Result<Arc<MemoryStore>> {
    let store = Arc::new(MemoryStore::default());
    store
        .upsert(&[
            record("same", [1.0, 0.0], "identical direction"),
            record("close", [0.9, 0.1], "nearly the same"),
            record("far", [0.0, 1.0], "orthogonal"),
        ])
        .await?;
    Ok(store)
}

#[tokio::test]
async fn test_retrieve_filters_by_score() -> Result<()> {
    let store = seeded().await?;
    let retriever = Retriever::new(store.clone(), 2, 10, 0.7);

    let chunks = retriever.retrieve(&[1.0, 0.0]).await?;
    let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["same", "close"]);
    assert_eq!(chunks[0].source.as_deref(), Some("memory"));
    assert!(chunks[0].score >= chunks[1].score);
    assert_eq!(store.queries.lock().unwrap().as_slice(), &[10]);
    Ok(())
}

#[tokio::test]
async fn test_overrides_apply() -> Result<()> {
    let store = seeded().await?;
    let retriever = Retriever::new(store.clone(), 2, 10, 0.7);

    let chunks = retriever.retrieve_with(&[1.0, 0.0], 1, 0.0).await?;
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].id, "same");

    let all = retriever.retrieve_with(&[1.0, 0.0], 10, 0.0).await?;
    assert_eq!(all.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_rejects_bad_vectors() -> Result<()> {
    let store = seeded().await?;
    let retriever = Retriever::new(store.clone(), 2, 10, 0.7);

    assert!(retriever.retrieve(&[]).await.is_err());
    let err = retriever.retrieve(&[1.0, 0.0, 0.0]).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    ));
    assert!(store.queries.lock().unwrap().is_empty());
    Ok(())
}
