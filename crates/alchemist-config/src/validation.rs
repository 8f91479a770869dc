//! Semantic checks applied after deserialization

use crate::error::{ConfigError, Result};

/// Checks that serde cannot express, run once the layers are merged
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// `value` within `min..=max`
pub fn validate_range(field: impl Into<String>, value: f32, min: f32, max: f32) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        })
    }
}

/// `value` strictly greater than `min`
pub fn validate_positive(field: impl Into<String>, value: usize, min: usize) -> Result<()> {
    if value > min {
        Ok(())
    } else {
        Err(ConfigError::InvalidInteger {
            field: field.into(),
            value,
            min,
        })
    }
}

/// An absent base URL is fine; a present one must be an http(s) URL
pub fn validate_api_base(field: impl Into<String>, api_base: Option<&str>) -> Result<()> {
    match api_base {
        None => Ok(()),
        Some("") => Err(ConfigError::validation(
            field,
            "API base URL cannot be empty string (use null to unset)",
        )),
        Some(url) if url.starts_with("https://") || url.starts_with("http://") => Ok(()),
        Some(url) => Err(ConfigError::validation(
            field,
            format!("API base must start with http:// or https://, got: {url}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(validate_range("retrieval.min_score", 0.0, 0.0, 1.0).is_ok());
        assert!(validate_range("retrieval.min_score", 1.0, 0.0, 1.0).is_ok());
        assert!(validate_range("retrieval.min_score", 1.01, 0.0, 1.0).is_err());
        assert!(validate_range("retrieval.min_score", -0.1, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_positive() {
        assert!(validate_positive("retrieval.top_k", 1, 0).is_ok());
        let err = validate_positive("retrieval.top_k", 0, 0).unwrap_err();
        assert_eq!(err.to_string(), "retrieval.top_k must be > 0, got 0");
    }

    #[test]
    fn test_api_base() {
        assert!(validate_api_base("llm.api_base", None).is_ok());
        assert!(validate_api_base("llm.api_base", Some("https://api.openai.com/v1")).is_ok());
        assert!(validate_api_base("llm.api_base", Some("http://localhost:8080/v1")).is_ok());
        assert!(validate_api_base("llm.api_base", Some("")).is_err());
        assert!(validate_api_base("llm.api_base", Some("localhost:8080")).is_err());
    }
}
