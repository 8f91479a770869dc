//! Retrieval configuration

use serde::{Deserialize, Serialize};

/// Similarity search parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of nearest chunks requested from the index
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Matches scoring below this are dropped (cosine similarity, 0.0 to 1.0)
    #[serde(default = "default_min_score")]
    pub min_score: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_score: default_min_score(),
        }
    }
}

impl crate::validation::Validate for RetrievalConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::validation::{validate_positive, validate_range};

        validate_positive("retrieval.top_k", self.top_k, 0)?;
        validate_range("retrieval.min_score", self.min_score, 0.0, 1.0)?;

        Ok(())
    }
}

fn default_top_k() -> usize {
    10
}

fn default_min_score() -> f32 {
    0.7
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validate;

    #[test]
    fn test_default_is_valid() {
        assert!(RetrievalConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_top_k_invalid() {
        let config = RetrievalConfig {
            top_k: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_score_out_of_range() {
        let config = RetrievalConfig {
            min_score: 1.2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
