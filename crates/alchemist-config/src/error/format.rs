//! Terminal rendering of [`ConfigError`]

use crate::error::ConfigError;
use std::fmt;
use yansi::Paint;

/// Colours the field and value of a config error when stderr is a terminal
pub struct ErrorFormatter {
    error: ConfigError,
    use_colors: bool,
}

impl ErrorFormatter {
    pub fn new(error: ConfigError) -> Self {
        let use_colors = std::env::var_os("NO_COLOR").is_none() && atty::is(atty::Stream::Stderr);
        Self { error, use_colors }
    }

    pub fn error(&self) -> &ConfigError {
        &self.error
    }

    fn write_colored(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = "✗".red().bold();
        match &self.error {
            ConfigError::InvalidEnum {
                field,
                value,
                options,
                hint,
            } => write!(
                f,
                "{mark} Invalid value {} for {}\n  {}: {options}\n  {}: {}",
                format!("'{value}'").yellow(),
                field.cyan(),
                "Valid options".bold(),
                "Hint".bold(),
                hint.green()
            ),
            ConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(
                f,
                "{mark} {} must be between {} and {}, got {}",
                field.cyan(),
                min.green(),
                max.green(),
                value.red()
            ),
            ConfigError::InvalidInteger { field, value, min } => write!(
                f,
                "{mark} {} must be > {}, got {}",
                field.cyan(),
                min.green(),
                value.red()
            ),
            ConfigError::ValidationError { field, message } => {
                write!(f, "{mark} {}: {message}", field.cyan())
            }
            ConfigError::EnvVarError { var, message } => {
                write!(f, "{mark} {}: {message}", var.yellow())
            }
            ConfigError::FileNotFound { path } => write!(
                f,
                "{mark} Configuration file not found: {}",
                path.display().to_string().yellow()
            ),
            other => write!(f, "{mark} {other}"),
        }
    }
}

impl fmt::Display for ErrorFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.use_colors {
            self.write_colored(f)
        } else {
            write!(f, "{}", self.error)
        }
    }
}
