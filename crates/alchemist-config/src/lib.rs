//! Settings for the chunk, embed, index and answer stages
//!
//! Everything below the CLI receives a [`Config`] value; no other crate
//! reads `ALCHEMIST_*` variables. API keys are the one exception and stay in
//! the environment, read once when a client is built.
//!
//! ```no_run
//! use alchemist_config::Config;
//!
//! // `.alchemist.{toml,yml,yaml,json}` in the working directory, then env
//! let config = Config::load()?;
//! assert!(config.chunking.max_overlap < config.chunking.min_tokens);
//!
//! let pinned = Config::from_file("deploy/alchemist.toml")?;
//! # Ok::<(), alchemist_config::ConfigError>(())
//! ```

pub mod error;
pub mod loader;
pub mod types;
pub mod validation;

pub use error::{ConfigError, ErrorFormatter, Result};
pub use loader::ConfigBuilder;
pub use types::*;
pub use validation::Validate;
