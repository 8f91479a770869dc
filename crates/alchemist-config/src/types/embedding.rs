//! Embedding provider configuration

use serde::{Deserialize, Serialize};

/// Embedding provider configuration
///
/// The provider speaks the OpenAI embeddings API; `api_base` can point it at
/// any compatible endpoint. The API key is read from `OPENAI_API_KEY` when the
/// client is built and never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// `text-embedding-3-large` or `text-embedding-3-small`
    #[serde(default = "default_model")]
    pub model: String,

    /// Requested vector length; responses of any other length are rejected
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Texts per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Requests in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Optional API base URL override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            dimensions: default_dimensions(),
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            api_base: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Hard limit on inputs per embeddings request
pub const MAX_BATCH_SIZE: usize = 2048;

impl crate::validation::Validate for EmbeddingConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;
        use crate::validation::{validate_api_base, validate_positive};

        if self.model.trim().is_empty() {
            return Err(ConfigError::validation("embedding.model", "model cannot be empty"));
        }

        validate_positive("embedding.dimensions", self.dimensions, 0)?;
        validate_positive("embedding.batch_size", self.batch_size, 0)?;
        validate_positive("embedding.concurrency", self.concurrency, 0)?;

        if self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::validation(
                "embedding.batch_size",
                format!(
                    "batch_size ({}) exceeds the provider limit of {}",
                    self.batch_size, MAX_BATCH_SIZE
                ),
            ));
        }

        validate_api_base("embedding.api_base", self.api_base.as_deref())
    }
}

fn default_model() -> String {
    "text-embedding-3-large".to_string()
}

fn default_dimensions() -> usize {
    3072
}

fn default_batch_size() -> usize {
    100
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    60
}
