//! Reading a single configuration file

use super::{formats, ConfigFormat};
use crate::{error::ConfigError, Config, Result, Validate};
use std::path::Path;

impl ConfigFormat {
    /// Format implied by the file extension, case-insensitively
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yml" | "yaml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn parse(self, content: &str, path: Option<&str>) -> Result<Config> {
        match self {
            Self::Yaml => formats::yaml::parse_with_path(content, path),
            Self::Toml => formats::toml::parse_with_path(content, path),
            Self::Json => formats::json::parse_with_path(content, path),
        }
    }
}

/// Parse and validate one file; missing keys keep their defaults
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnknownFormat {
        path: path.to_path_buf(),
    })?;

    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let config = format.parse(&content, path.to_str())?;
    config.validate()?;
    Ok(config)
}
