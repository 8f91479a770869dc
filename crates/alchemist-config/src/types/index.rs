//! Vector index configuration

use serde::{Deserialize, Serialize};

/// Hosted vector index (Pinecone) configuration
///
/// The API key comes from `PINECONE_API_KEY` at client construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index name; created on first upsert when missing
    #[serde(default = "default_name")]
    pub name: String,

    /// Serverless cloud provider
    #[serde(default = "default_cloud")]
    pub cloud: String,

    /// Serverless region
    #[serde(default = "default_region")]
    pub region: String,

    /// Vectors per upsert request
    #[serde(default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,

    /// Control plane endpoint used to list, describe and create indexes
    #[serde(default = "default_control_plane")]
    pub control_plane: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            cloud: default_cloud(),
            region: default_region(),
            upsert_batch_size: default_upsert_batch_size(),
            control_plane: default_control_plane(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl crate::validation::Validate for IndexConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;
        use crate::validation::{validate_api_base, validate_positive};

        // Pinecone: lowercase alphanumerics and '-', at most 45 chars
        let valid_name = !self.name.is_empty()
            && self.name.len() <= 45
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_name {
            return Err(ConfigError::validation(
                "index.name",
                format!(
                    "'{}' must be 1-45 lowercase alphanumeric characters or '-'",
                    self.name
                ),
            ));
        }

        if self.region.is_empty() {
            return Err(ConfigError::validation(
                "index.region",
                "Region cannot be empty",
            ));
        }

        validate_positive("index.upsert_batch_size", self.upsert_batch_size, 0)?;
        validate_api_base("index.control_plane", Some(&self.control_plane))
    }
}

fn default_name() -> String {
    "rag-alchemist".to_string()
}

fn default_cloud() -> String {
    "aws".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_upsert_batch_size() -> usize {
    100
}

fn default_control_plane() -> String {
    "https://api.pinecone.io".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validate;

    #[test]
    fn test_default_is_valid() {
        assert!(IndexConfig::default().validate().is_ok());
    }

    #[test]
    fn test_uppercase_name_invalid() {
        let config = IndexConfig {
            name: "RAG_Index".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_batch_invalid() {
        let config = IndexConfig {
            upsert_batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
