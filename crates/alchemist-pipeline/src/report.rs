use alchemist_core::models::{BoundaryCondition, Chunk};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Token statistics over one document's chunks
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChunkStats {
    pub chunks: usize,
    pub total_tokens: usize,
    pub min_tokens: usize,
    pub max_tokens: usize,
    pub avg_tokens: f64,
    pub overlap_tokens: usize,
    pub boundary: BTreeMap<BoundaryCondition, usize>,
}

impl ChunkStats {
    pub fn from_chunks(chunks: &[Chunk]) -> Self {
        if chunks.is_empty() {
            return Self::default();
        }

        let mut boundary = BTreeMap::new();
        for condition in chunks.iter().flat_map(|c| c.boundary.iter()) {
            *boundary.entry(*condition).or_insert(0) += 1;
        }

        let total_tokens: usize = chunks.iter().map(|c| c.token_count).sum();
        Self {
            chunks: chunks.len(),
            total_tokens,
            min_tokens: chunks.iter().map(|c| c.token_count).min().unwrap_or(0),
            max_tokens: chunks.iter().map(|c| c.token_count).max().unwrap_or(0),
            avg_tokens: total_tokens as f64 / chunks.len() as f64,
            overlap_tokens: chunks.iter().map(|c| c.overlap_token_count).sum(),
            boundary,
        }
    }

    pub fn count(&self, condition: BoundaryCondition) -> usize {
        self.boundary.get(&condition).copied().unwrap_or(0)
    }
}

/// Wall-clock time per indexing stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IndexTimings {
    pub chunking: Duration,
    pub embedding: Duration,
    pub upsert: Duration,
    pub total: Duration,
}

/// Outcome of indexing one document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub stats: ChunkStats,
    pub vectors_upserted: usize,
    pub timings: IndexTimings,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: usize, tokens: usize, boundary: Vec<BoundaryCondition>) -> Chunk {
        Chunk {
            index,
            document_id: None,
            text: String::new(),
            token_count: tokens,
            overlap_token_count: if index == 0 { 0 } else { 10 },
            start_byte: 0,
            end_byte: 0,
            boundary,
        }
    }

    #[test]
    fn test_stats() {
        let stats = ChunkStats::from_chunks(&[
            chunk(0, 800, vec![]),
            chunk(1, 900, vec![BoundaryCondition::OversizedSentence]),
            chunk(2, 100, vec![BoundaryCondition::InsufficientOverlap, BoundaryCondition::ShortTrailingChunk]),
        ]);
        assert_eq!(stats.chunks, 3);
        assert_eq!(stats.total_tokens, 1800);
        assert_eq!(stats.min_tokens, 100);
        assert_eq!(stats.max_tokens, 900);
        assert_eq!(stats.avg_tokens, 600.0);
        assert_eq!(stats.overlap_tokens, 20);
        assert_eq!(stats.count(BoundaryCondition::OversizedSentence), 1);
        assert_eq!(stats.count(BoundaryCondition::OverlapTrimmed), 0);
    }

    #[test]
    fn test_empty() {
        assert_eq!(ChunkStats::from_chunks(&[]), ChunkStats::default());
    }
}
