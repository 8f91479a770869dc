use crate::models::BoundaryCondition;
use serde::Serialize;
use tracing::info;

/// A boundary condition met while packing one chunk
///
/// These are expected outcomes with a defined resolution, never failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BoundaryEvent {
    /// A single sentence exceeded `max_tokens` and became its own chunk
    OversizedSentence {
        chunk_index: usize,
        sentence_index: usize,
        token_count: usize,
        max_tokens: usize,
    },
    /// The document ran out before the last chunk reached `min_tokens`
    ShortTrailingChunk {
        chunk_index: usize,
        token_count: usize,
        min_tokens: usize,
    },
    /// A chunk closed below `min_tokens` because the next sentence would
    /// have pushed it past `max_tokens`
    UndersizedChunk {
        chunk_index: usize,
        token_count: usize,
        min_tokens: usize,
        next_sentence_index: usize,
    },
    /// Less overlap than `min_overlap` was available
    InsufficientOverlap {
        chunk_index: usize,
        overlap_tokens: usize,
        min_overlap: usize,
    },
    /// Leading overlap sentences were dropped to fit the first new sentence
    OverlapTrimmed {
        chunk_index: usize,
        dropped_sentences: usize,
        overlap_tokens: usize,
    },
}

impl BoundaryEvent {
    pub fn chunk_index(&self) -> usize {
        match self {
            BoundaryEvent::OversizedSentence { chunk_index, .. }
            | BoundaryEvent::ShortTrailingChunk { chunk_index, .. }
            | BoundaryEvent::UndersizedChunk { chunk_index, .. }
            | BoundaryEvent::InsufficientOverlap { chunk_index, .. }
            | BoundaryEvent::OverlapTrimmed { chunk_index, .. } => *chunk_index,
        }
    }

    pub fn condition(&self) -> BoundaryCondition {
        match self {
            BoundaryEvent::OversizedSentence { .. } => BoundaryCondition::OversizedSentence,
            BoundaryEvent::ShortTrailingChunk { .. } => BoundaryCondition::ShortTrailingChunk,
            BoundaryEvent::UndersizedChunk { .. } => BoundaryCondition::UndersizedChunk,
            BoundaryEvent::InsufficientOverlap { .. } => BoundaryCondition::InsufficientOverlap,
            BoundaryEvent::OverlapTrimmed { .. } => BoundaryCondition::OverlapTrimmed,
        }
    }
}

/// Receiver for boundary events
///
/// Injected into the chunker so the packing logic never depends on a
/// process-wide logger.
pub trait BoundarySink: Send + Sync {
    fn record(&self, event: &BoundaryEvent);
}

/// Default sink: one `info` line per event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl BoundarySink for TracingSink {
    fn record(&self, event: &BoundaryEvent) {
        match event {
            BoundaryEvent::OversizedSentence {
                chunk_index,
                sentence_index,
                token_count,
                max_tokens,
            } => info!(
                chunk_index,
                sentence_index,
                token_count,
                max_tokens,
                "sentence exceeds max_tokens; emitted as its own chunk"
            ),
            BoundaryEvent::ShortTrailingChunk {
                chunk_index,
                token_count,
                min_tokens,
            } => info!(
                chunk_index,
                token_count, min_tokens, "trailing chunk below min_tokens"
            ),
            BoundaryEvent::UndersizedChunk {
                chunk_index,
                token_count,
                min_tokens,
                next_sentence_index,
            } => info!(
                chunk_index,
                token_count,
                min_tokens,
                next_sentence_index,
                "chunk closed below min_tokens; next sentence would overflow"
            ),
            BoundaryEvent::InsufficientOverlap {
                chunk_index,
                overlap_tokens,
                min_overlap,
            } => info!(
                chunk_index,
                overlap_tokens, min_overlap, "overlap below min_overlap"
            ),
            BoundaryEvent::OverlapTrimmed {
                chunk_index,
                dropped_sentences,
                overlap_tokens,
            } => info!(
                chunk_index,
                dropped_sentences, overlap_tokens, "overlap trimmed to fit max_tokens"
            ),
        }
    }
}
