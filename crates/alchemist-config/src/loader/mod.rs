//! Layered configuration loading
//!
//! Precedence, lowest first: built-in defaults, configuration files in the
//! order given, `ALCHEMIST_*` environment variables, then explicit overrides.

pub mod env;
pub mod file;
pub mod formats;
pub mod merge;

use crate::{Config, Result, Validate};
use std::path::{Path, PathBuf};

/// File names probed by [`Config::load`], first match wins
pub const DEFAULT_PATHS: &[&str] = &[
    ".alchemist.toml",
    ".alchemist.yml",
    ".alchemist.yaml",
    ".alchemist.json",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

#[derive(Debug, Clone)]
enum Layer {
    File(PathBuf),
    Environment,
    Overrides(Config),
}

/// Collects layers and merges them on [`ConfigBuilder::build`]
///
/// ```no_run
/// use alchemist_config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .with_file(".alchemist.toml")
///     .with_env()
///     .build()?;
/// # Ok::<(), alchemist_config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    layers: Vec<Layer>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.layers.push(Layer::File(path.as_ref().to_path_buf()));
        self
    }

    pub fn with_env(mut self) -> Self {
        self.layers.push(Layer::Environment);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.layers.push(Layer::Overrides(config));
        self
    }

    /// Merge every layer over the defaults and validate the result
    ///
    /// Each file is validated on its own as well, so an error names the file
    /// that introduced it.
    pub fn build(self) -> Result<Config> {
        let config = self
            .layers
            .into_iter()
            .try_fold(Config::default(), |acc, layer| -> Result<Config> {
                let overlay = match layer {
                    Layer::File(path) => Some(file::load_from_file(&path)?),
                    Layer::Environment => env::from_env()?,
                    Layer::Overrides(config) => Some(config),
                };
                Ok(match overlay {
                    Some(overlay) => merge::merge(acc, overlay),
                    None => acc,
                })
            })?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        Self::new().with_file(path).build()
    }
}

/// First of [`DEFAULT_PATHS`] present in `dir`
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_PATHS
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

impl Config {
    /// Defaults, then the discovered file in the working directory if any,
    /// then the environment
    pub fn load() -> Result<Self> {
        let builder = match discover(Path::new(".")) {
            Some(path) => ConfigBuilder::new().with_file(path),
            None => ConfigBuilder::new(),
        };
        builder.with_env().build()
    }

    /// An explicit file, then the environment
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        ConfigBuilder::new().with_file(path).with_env().build()
    }
}
