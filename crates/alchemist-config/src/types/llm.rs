//! Answer generation settings

use serde::{Deserialize, Serialize};

/// Chat model used to answer questions from retrieved context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Chat completion model, e.g. `gpt-5` or `gpt-4o-mini`
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    ///
    /// Not sent to `gpt-5*` models, which only support their fixed default.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens for LLM responses; provider default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// OpenAI-compatible endpoint to use instead of api.openai.com
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            api_base: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl crate::validation::Validate for LlmConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;
        use crate::validation::{validate_api_base, validate_range};

        if self.model.trim().is_empty() {
            return Err(ConfigError::validation("llm.model", "model cannot be empty"));
        }

        validate_range("llm.temperature", self.temperature, 0.0, 2.0)?;

        if self.max_tokens == Some(0) {
            return Err(ConfigError::validation("llm.max_tokens", "must be > 0 when set"));
        }

        validate_api_base("llm.api_base", self.api_base.as_deref())
    }
}

fn default_model() -> String {
    "gpt-5".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    120
}
