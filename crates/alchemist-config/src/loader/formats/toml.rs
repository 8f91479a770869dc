//! TOML format parser

use crate::{error::ConfigError, Config, Result};

/// Parse configuration from TOML string
pub fn parse(content: &str) -> Result<Config> {
    parse_with_path(content, None)
}

/// Parse configuration from TOML string with file path for better errors
pub fn parse_with_path(content: &str, path: Option<&str>) -> Result<Config> {
    ::toml::from_str(content).map_err(|e| ConfigError::from_toml_error(e, content, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml() {
        let toml = r#"
[retrieval]
top_k = 5
min_score = 0.5

[llm]
model = "gpt-4o-mini"
max_tokens = 512
"#;
        let config = parse(toml).unwrap();
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, Some(512));
    }

    #[test]
    fn test_type_error_has_context() {
        let toml = "[retrieval]\ntop_k = \"many\"\n";
        let err = parse(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "TOML", .. }));
        assert!(err.to_string().contains("top_k"));
    }
}
