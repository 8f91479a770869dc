use thiserror::Error;
use tracing::{debug, warn};

/// Shortest accepted query, in characters after trimming
pub const MIN_QUERY_CHARS: usize = 2;

/// Queries longer than this are truncated before embedding
pub const MAX_QUERY_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query cannot be empty")]
    Empty,

    #[error("query is too short (minimum {min} characters)")]
    TooShort { min: usize },
}

/// Validate and normalise a user query
///
/// Trims, collapses runs of whitespace to a single space and truncates to
/// [`MAX_QUERY_CHARS`] characters.
pub fn preprocess_query(raw: &str) -> Result<String, QueryError> {
    if raw.trim().is_empty() {
        return Err(QueryError::Empty);
    }
    if raw.trim().chars().count() < MIN_QUERY_CHARS {
        return Err(QueryError::TooShort {
            min: MIN_QUERY_CHARS,
        });
    }

    let mut processed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let length = processed.chars().count();
    if length > MAX_QUERY_CHARS {
        warn!(
            length,
            max = MAX_QUERY_CHARS,
            "query exceeds maximum length; truncating"
        );
        if let Some((cut, _)) = processed.char_indices().nth(MAX_QUERY_CHARS) {
            processed.truncate(cut);
        }
        let trimmed = processed.trim_end().len();
        processed.truncate(trimmed);
    }

    debug!(query = %processed, "preprocessed query");
    Ok(processed)
}
