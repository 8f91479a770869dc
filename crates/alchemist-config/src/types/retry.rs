//! Retry/backoff configuration for hosted API calls

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first call
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles for each one after
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Cap on the exponential delay
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Upper bound of the random delay added to each backoff
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter_ms: default_jitter_ms(),
        }
    }
}

impl crate::validation::Validate for RetryConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;

        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidInteger {
                field: "retry.max_attempts".to_string(),
                value: 0,
                min: 0,
            });
        }

        if self.base_delay_ms > self.max_delay_ms {
            return Err(ConfigError::validation(
                "retry.base_delay_ms",
                format!(
                    "base_delay_ms ({}) must be <= max_delay_ms ({})",
                    self.base_delay_ms, self.max_delay_ms
                ),
            ));
        }

        Ok(())
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_jitter_ms() -> u64 {
    2_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validate;

    #[test]
    fn test_default_is_valid() {
        assert!(RetryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_invalid() {
        let config = RetryConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_above_cap_invalid() {
        let config = RetryConfig {
            base_delay_ms: 20_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
