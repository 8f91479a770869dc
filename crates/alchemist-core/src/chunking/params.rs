use super::ChunkingError;
use alchemist_config::ChunkingConfig;
use serde::{Deserialize, Serialize};

/// Token window for the chunker
///
/// Exactly the four values the packer interprets. Built from
/// [`ChunkingConfig`] by the caller so the core never touches process-wide
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkParams {
    pub min_tokens: usize,
    pub max_tokens: usize,
    pub min_overlap: usize,
    pub max_overlap: usize,
}

impl ChunkParams {
    pub fn new(min_tokens: usize, max_tokens: usize, min_overlap: usize, max_overlap: usize) -> Self {
        Self {
            min_tokens,
            max_tokens,
            min_overlap,
            max_overlap,
        }
    }

    /// Check the three parameter relations, reporting the first one violated
    pub fn validate(&self) -> Result<(), ChunkingError> {
        // Covered by the relations below; reported separately for a plainer message.
        if self.max_tokens == 0 {
            return Err(ChunkingError::ZeroMaxTokens);
        }
        if self.min_tokens > self.max_tokens {
            return Err(ChunkingError::MinTokensAboveMax {
                min_tokens: self.min_tokens,
                max_tokens: self.max_tokens,
            });
        }
        if self.min_overlap > self.max_overlap {
            return Err(ChunkingError::MinOverlapAboveMax {
                min_overlap: self.min_overlap,
                max_overlap: self.max_overlap,
            });
        }
        if self.max_overlap >= self.min_tokens {
            return Err(ChunkingError::OverlapNotBelowChunk {
                max_overlap: self.max_overlap,
                min_tokens: self.min_tokens,
            });
        }
        Ok(())
    }
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self::from(&ChunkingConfig::default())
    }
}

impl From<&ChunkingConfig> for ChunkParams {
    fn from(config: &ChunkingConfig) -> Self {
        Self {
            min_tokens: config.min_tokens,
            max_tokens: config.max_tokens,
            min_overlap: config.min_overlap,
            max_overlap: config.max_overlap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_config() {
        let params = ChunkParams::default();
        assert_eq!(params, ChunkParams::new(400, 800, 80, 150));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_each_constraint_reported() {
        assert_eq!(
            ChunkParams::new(900, 800, 80, 150).validate(),
            Err(ChunkingError::MinTokensAboveMax {
                min_tokens: 900,
                max_tokens: 800
            })
        );
        assert_eq!(
            ChunkParams::new(400, 800, 200, 150).validate(),
            Err(ChunkingError::MinOverlapAboveMax {
                min_overlap: 200,
                max_overlap: 150
            })
        );
        assert_eq!(
            ChunkParams::new(400, 800, 80, 400).validate(),
            Err(ChunkingError::OverlapNotBelowChunk {
                max_overlap: 400,
                min_tokens: 400
            })
        );
    }

    #[test]
    fn test_message_names_values() {
        let err = ChunkParams::new(400, 800, 80, 500).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid chunking parameters: max_overlap (500) must be < min_tokens (400)"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_zero_overlap_window_allowed() {
        assert!(ChunkParams::new(1, 1, 0, 0).validate().is_ok());
    }

    #[test]
    fn test_zero_window_reported_plainly() {
        assert_eq!(
            ChunkParams::new(0, 0, 0, 0).validate(),
            Err(ChunkingError::ZeroMaxTokens)
        );
        // The same window is already out by the overlap relation.
        let zero = ChunkParams::new(0, 0, 0, 0);
        assert!(zero.max_overlap >= zero.min_tokens);
    }
}
