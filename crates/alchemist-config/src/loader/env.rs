//! Environment variable configuration overlay
//!
//! Supports environment variables in the format:
//! `ALCHEMIST_<section>_<field>=value`
//!
//! Examples:
//! - `ALCHEMIST_CHUNKING_MAX_TOKENS=700`
//! - `ALCHEMIST_RETRIEVAL_TOP_K=15`
//! - `ALCHEMIST_LLM_MODEL=gpt-4o-mini`

use crate::{error::ConfigError, types::*, Config, Result};
use std::env;
use std::str::FromStr;

const PREFIX: &str = "ALCHEMIST_";

/// Parse configuration from environment variables
///
/// Returns `None` when no `ALCHEMIST_` variable is set. API keys are not part
/// of this overlay; clients read them directly at construction.
pub fn from_env() -> Result<Option<Config>> {
    let mut env_vars: Vec<(String, String)> =
        env::vars().filter(|(k, _)| k.starts_with(PREFIX)).collect();

    if env_vars.is_empty() {
        return Ok(None);
    }

    // Deterministic application order
    env_vars.sort();

    let mut config = Config::default();
    for (key, value) in env_vars {
        apply_env_var(&mut config, &key, &value)?;
    }

    Ok(Some(config))
}

/// Apply a single environment variable to config
fn apply_env_var(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let stripped = key.strip_prefix(PREFIX).unwrap_or(key);

    let Some((section, field)) = stripped.split_once('_') else {
        return Err(ConfigError::EnvVarError {
            var: key.to_string(),
            message: "Expected format: ALCHEMIST_<section>_<field>".to_string(),
        });
    };

    let section = section.to_lowercase();
    let field = field.to_lowercase();
    let var = EnvVar {
        name: key,
        field: &field,
        value,
    };

    match section.as_str() {
        "chunking" => apply_chunking_var(&mut config.chunking, &var),
        "embedding" => apply_embedding_var(&mut config.embedding, &var),
        "index" => apply_index_var(&mut config.index, &var),
        "retrieval" => apply_retrieval_var(&mut config.retrieval, &var),
        "llm" => apply_llm_var(&mut config.llm, &var),
        "retry" => apply_retry_var(&mut config.retry, &var),
        _ => Err(ConfigError::EnvVarError {
            var: key.to_string(),
            message: format!("Unknown section: {}", section),
        }),
    }
}

/// One `ALCHEMIST_*` variable split into its parts
struct EnvVar<'a> {
    name: &'a str,
    field: &'a str,
    value: &'a str,
}

impl EnvVar<'_> {
    fn parse<T: FromStr>(&self, kind: &str) -> Result<T> {
        self.value.trim().parse().map_err(|_| ConfigError::EnvVarError {
            var: self.name.to_string(),
            message: format!("Invalid {}: {}", kind, self.value),
        })
    }

    fn integer<T: FromStr>(&self) -> Result<T> {
        self.parse("integer")
    }

    fn float(&self) -> Result<f32> {
        self.parse("float")
    }

    fn unknown_field(&self) -> ConfigError {
        ConfigError::EnvVarError {
            var: self.name.to_string(),
            message: format!("Unknown field: {}", self.field),
        }
    }
}

fn apply_chunking_var(config: &mut ChunkingConfig, var: &EnvVar<'_>) -> Result<()> {
    match var.field {
        "min_tokens" => config.min_tokens = var.integer()?,
        "max_tokens" => config.max_tokens = var.integer()?,
        "min_overlap" => config.min_overlap = var.integer()?,
        "max_overlap" => config.max_overlap = var.integer()?,
        "tokenizer" => {
            config.tokenizer = TokenizerKind::parse(var.value).ok_or_else(|| {
                ConfigError::invalid_enum("chunking.tokenizer", var.value, TokenizerKind::OPTIONS)
            })?;
        }
        _ => return Err(var.unknown_field()),
    }
    Ok(())
}

fn apply_embedding_var(config: &mut EmbeddingConfig, var: &EnvVar<'_>) -> Result<()> {
    match var.field {
        "model" => config.model = var.value.to_string(),
        "dimensions" => config.dimensions = var.integer()?,
        "batch_size" => config.batch_size = var.integer()?,
        "concurrency" => config.concurrency = var.integer()?,
        "api_base" => config.api_base = Some(var.value.to_string()),
        "timeout_secs" => config.timeout_secs = var.integer()?,
        _ => return Err(var.unknown_field()),
    }
    Ok(())
}

fn apply_index_var(config: &mut IndexConfig, var: &EnvVar<'_>) -> Result<()> {
    match var.field {
        "name" => config.name = var.value.to_string(),
        "cloud" => config.cloud = var.value.to_string(),
        "region" => config.region = var.value.to_string(),
        "upsert_batch_size" => config.upsert_batch_size = var.integer()?,
        "control_plane" => config.control_plane = var.value.to_string(),
        "timeout_secs" => config.timeout_secs = var.integer()?,
        _ => return Err(var.unknown_field()),
    }
    Ok(())
}

fn apply_retrieval_var(config: &mut RetrievalConfig, var: &EnvVar<'_>) -> Result<()> {
    match var.field {
        "top_k" => config.top_k = var.integer()?,
        "min_score" => config.min_score = var.float()?,
        _ => return Err(var.unknown_field()),
    }
    Ok(())
}

fn apply_llm_var(config: &mut LlmConfig, var: &EnvVar<'_>) -> Result<()> {
    match var.field {
        "model" => config.model = var.value.to_string(),
        "temperature" => config.temperature = var.float()?,
        "max_tokens" => config.max_tokens = Some(var.integer()?),
        "api_base" => config.api_base = Some(var.value.to_string()),
        "timeout_secs" => config.timeout_secs = var.integer()?,
        _ => return Err(var.unknown_field()),
    }
    Ok(())
}

fn apply_retry_var(config: &mut RetryConfig, var: &EnvVar<'_>) -> Result<()> {
    match var.field {
        "max_attempts" => config.max_attempts = var.integer()?,
        "base_delay_ms" => config.base_delay_ms = var.integer()?,
        "max_delay_ms" => config.max_delay_ms = var.integer()?,
        "jitter_ms" => config.jitter_ms = var.integer()?,
        _ => return Err(var.unknown_field()),
    }
    Ok(())
}
