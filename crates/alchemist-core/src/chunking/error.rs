use thiserror::Error;

/// Failures of the chunking core
///
/// Parameter errors are raised before any text is read. A coverage error
/// means the segmenter dropped or duplicated input and points at a bug, not
/// at bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkingError {
    #[error("invalid chunking parameters: min_tokens ({min_tokens}) must be <= max_tokens ({max_tokens})")]
    MinTokensAboveMax { min_tokens: usize, max_tokens: usize },

    #[error("invalid chunking parameters: min_overlap ({min_overlap}) must be <= max_overlap ({max_overlap})")]
    MinOverlapAboveMax {
        min_overlap: usize,
        max_overlap: usize,
    },

    #[error("invalid chunking parameters: max_overlap ({max_overlap}) must be < min_tokens ({min_tokens})")]
    OverlapNotBelowChunk {
        max_overlap: usize,
        min_tokens: usize,
    },

    /// Implied by the other three relations (a zero window forces
    /// `max_overlap >= min_tokens`); checked first only for a clearer message.
    #[error("invalid chunking parameters: max_tokens must be > 0")]
    ZeroMaxTokens,

    #[error(
        "sentence segmentation lost coverage at sentence {sentence_index} \
         (len {sentence_len}): expected offset {expected_offset}, found {actual_offset}"
    )]
    Coverage {
        sentence_index: usize,
        sentence_len: usize,
        expected_offset: usize,
        actual_offset: usize,
    },
}

impl ChunkingError {
    pub fn is_configuration(&self) -> bool {
        !matches!(self, ChunkingError::Coverage { .. })
    }
}
