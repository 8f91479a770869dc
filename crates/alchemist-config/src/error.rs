//! Errors raised while loading or validating configuration

pub mod format;

use std::path::PathBuf;
use thiserror::Error;

pub use format::ErrorFormatter;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unknown configuration format for file: {path}\nSupported formats: .toml, .yml, .yaml, .json")]
    UnknownFormat { path: PathBuf },

    #[error("Failed to read configuration file: {path}\n{source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Syntax or type error, with the offending lines rendered in `context`
    #[error("Failed to parse {format} configuration{location}:\n{message}\n{context}")]
    Parse {
        format: &'static str,
        location: String,
        message: String,
        context: String,
    },

    #[error("Invalid value '{value}' for {field}\n  Valid options: {options}\n  Hint: {hint}")]
    InvalidEnum {
        field: String,
        value: String,
        options: String,
        hint: String,
    },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("{field} must be > {min}, got {value}")]
    InvalidInteger {
        field: String,
        value: usize,
        min: usize,
    },

    #[error("Failed to parse environment variable {var}: {message}")]
    EnvVarError { var: String, message: String },

    #[error("Validation error: {field}: {message}")]
    ValidationError { field: String, message: String },
}

impl ConfigError {
    /// Unknown enum value, with a "did you mean" hint when one option is close
    pub fn invalid_enum(
        field: impl Into<String>,
        value: impl Into<String>,
        options: &[&str],
    ) -> Self {
        let value = value.into();
        let hint = match closest_option(&value, options) {
            Some(option) => format!("Did you mean '{option}'?"),
            None => "Check your configuration file".to_string(),
        };
        Self::InvalidEnum {
            field: field.into(),
            value,
            options: options.join(", "),
            hint,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    fn parse(
        format: &'static str,
        message: String,
        path: Option<&str>,
        context: String,
    ) -> Self {
        Self::Parse {
            format,
            location: path.map(|p| format!(" in {p}")).unwrap_or_default(),
            message,
            context,
        }
    }

    pub fn from_yaml_error(err: serde_yaml::Error, content: &str, path: Option<&str>) -> Self {
        let context = err
            .location()
            .map(|loc| render_context(content, loc.line(), None))
            .unwrap_or_default();
        Self::parse("YAML", err.to_string(), path, context)
    }

    pub fn from_toml_error(err: toml::de::Error, content: &str, path: Option<&str>) -> Self {
        let context = err
            .span()
            .map(|span| {
                let offset = span.start.min(content.len());
                let line = content.as_bytes()[..offset]
                    .iter()
                    .filter(|b| **b == b'\n')
                    .count();
                render_context(content, line + 1, None)
            })
            .unwrap_or_default();
        Self::parse("TOML", err.message().to_string(), path, context)
    }

    pub fn from_json_error(err: serde_json::Error, content: &str, path: Option<&str>) -> Self {
        let context = render_context(content, err.line(), Some(err.column()));
        Self::parse("JSON", err.to_string(), path, context)
    }
}

/// Option within edit distance 3 of `input`, ignoring case
fn closest_option<'a>(input: &str, options: &[&'a str]) -> Option<&'a str> {
    let input = input.to_lowercase();
    options
        .iter()
        .map(|opt| (*opt, edit_distance(&input, &opt.to_lowercase())))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(opt, _)| opt)
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = (above + 1)
                .min(row[j] + 1)
                .min(diagonal + usize::from(ca != *cb));
            diagonal = above;
        }
    }
    row[b.len()]
}

/// The offending line (1-based) with one line either side
fn render_context(content: &str, line_num: usize, column: Option<usize>) -> String {
    let total = content.lines().count();
    if line_num == 0 || line_num > total {
        return String::new();
    }

    let first = line_num.saturating_sub(1).max(1);
    let last = (line_num + 1).min(total);
    let mut out = Vec::new();

    for (num, line) in content.lines().enumerate().map(|(i, l)| (i + 1, l)) {
        if num < first || num > last {
            continue;
        }
        if num != line_num {
            out.push(format!("  {num:3} | {line}"));
            continue;
        }
        out.push(format!("→ {num:3} | {line}"));
        if let Some(col) = column.filter(|c| *c > 0) {
            out.push(format!("        {}^", " ".repeat(col - 1)));
        }
    }
    out.join("\n")
}
