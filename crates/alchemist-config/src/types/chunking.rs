//! Sentence chunking configuration

use serde::{Deserialize, Serialize};

/// Configuration for the token-windowed sentence chunker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Smallest token count a non-final chunk should close at
    #[serde(default = "default_min_tokens")]
    pub min_tokens: usize,

    /// Hard token ceiling for a chunk
    ///
    /// Only a single sentence that alone exceeds this may produce a larger
    /// chunk.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Desired lower bound for the overlap carried into the next chunk
    #[serde(default = "default_min_overlap")]
    pub min_overlap: usize,

    /// Upper bound for the overlap carried into the next chunk
    ///
    /// Must stay below `min_tokens` so overlap never fills a whole chunk.
    #[serde(default = "default_max_overlap")]
    pub max_overlap: usize,

    /// Tokenization scheme used for every count in a run
    #[serde(default)]
    pub tokenizer: TokenizerKind,
}

/// Token counting scheme
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// OpenAI `cl100k_base` BPE, matching the embedding models
    #[default]
    Cl100k,
    /// Unicode word count (UAX #29)
    Words,
}

impl TokenizerKind {
    pub const OPTIONS: &'static [&'static str] = &["cl100k", "words"];

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "cl100k" | "cl100k_base" => Some(Self::Cl100k),
            "words" | "word" => Some(Self::Words),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cl100k => "cl100k",
            Self::Words => "words",
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            min_tokens: default_min_tokens(),
            max_tokens: default_max_tokens(),
            min_overlap: default_min_overlap(),
            max_overlap: default_max_overlap(),
            tokenizer: TokenizerKind::default(),
        }
    }
}

impl crate::validation::Validate for ChunkingConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;
        use crate::validation::validate_positive;

        // Implied by the overlap rule below; kept so a zero window names max_tokens.
        validate_positive("chunking.max_tokens", self.max_tokens, 0)?;

        if self.min_tokens > self.max_tokens {
            return Err(ConfigError::validation(
                "chunking.min_tokens",
                format!(
                    "min_tokens ({}) must be <= max_tokens ({})",
                    self.min_tokens, self.max_tokens
                ),
            ));
        }

        if self.min_overlap > self.max_overlap {
            return Err(ConfigError::validation(
                "chunking.min_overlap",
                format!(
                    "min_overlap ({}) must be <= max_overlap ({})",
                    self.min_overlap, self.max_overlap
                ),
            ));
        }

        if self.max_overlap >= self.min_tokens {
            return Err(ConfigError::validation(
                "chunking.max_overlap",
                format!(
                    "max_overlap ({}) must be < min_tokens ({})",
                    self.max_overlap, self.min_tokens
                ),
            ));
        }

        Ok(())
    }
}

fn default_min_tokens() -> usize {
    400
}

fn default_max_tokens() -> usize {
    800
}

fn default_min_overlap() -> usize {
    80
}

fn default_max_overlap() -> usize {
    150
}
