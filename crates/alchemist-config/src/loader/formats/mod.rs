//! Per-format parsers
//!
//! Each parser maps syntax errors to a [`crate::ConfigError`] carrying the
//! offending lines.

pub mod json;
pub mod toml;
pub mod yaml;
