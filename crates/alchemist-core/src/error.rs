use std::time::Duration;
use thiserror::Error;

/// Failure talking to a remote API (embeddings, chat, vector index)
///
/// Raised inside `anyhow::Error` by the clients; [`is_transient`] recovers
/// it to decide whether a call is worth repeating.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("{service} API error: {status} - {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} rate limit exceeded")]
    RateLimited {
        service: &'static str,
        retry_after: Option<Duration>,
    },

    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
        transient: bool,
    },

    #[error("malformed {service} response: {message}")]
    MalformedResponse {
        service: &'static str,
        message: String,
    },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl ApiError {
    /// Map a non-success HTTP status to an error
    pub fn from_status(
        service: &'static str,
        status: u16,
        body: String,
        retry_after: Option<Duration>,
    ) -> Self {
        if status == 429 {
            ApiError::RateLimited {
                service,
                retry_after,
            }
        } else {
            ApiError::Status {
                service,
                status,
                body,
            }
        }
    }

    pub fn malformed(service: &'static str, message: impl Into<String>) -> Self {
        ApiError::MalformedResponse {
            service,
            message: message.into(),
        }
    }

    /// Rate limits, server errors and dropped connections
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::RateLimited { .. } => true,
            ApiError::Status { status, .. } => *status >= 500,
            ApiError::Transport { transient, .. } => *transient,
            ApiError::MalformedResponse { .. } | ApiError::DimensionMismatch { .. } => false,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ApiError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Whether an error wraps a transient [`ApiError`]
pub fn is_transient(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ApiError>()
        .map(ApiError::is_transient)
        .unwrap_or(false)
}

/// Server-requested delay carried by an error, if any
pub fn retry_after(err: &anyhow::Error) -> Option<Duration> {
    err.downcast_ref::<ApiError>().and_then(ApiError::retry_after)
}

/// Parse a `Retry-After` header given in (possibly fractional) seconds
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_status_classification() {
        let rate = ApiError::from_status("OpenAI", 429, String::new(), None);
        assert!(matches!(rate, ApiError::RateLimited { .. }));
        assert!(rate.is_transient());
        assert!(ApiError::from_status("OpenAI", 503, "busy".into(), None).is_transient());
        assert!(!ApiError::from_status("OpenAI", 401, "bad key".into(), None).is_transient());
        assert!(!ApiError::DimensionMismatch {
            expected: 3072,
            actual: 1536
        }
        .is_transient());
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err = anyhow::Error::new(ApiError::RateLimited {
            service: "Pinecone",
            retry_after: Some(Duration::from_secs(2)),
        });
        assert!(is_transient(&err));
        assert_eq!(retry_after(&err), Some(Duration::from_secs(2)));

        let context = err.context("upserting batch 3");
        assert!(is_transient(&context));

        assert!(!is_transient(&anyhow!("plain failure")));
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("3"), Some(Duration::from_secs(3)));
        assert_eq!(parse_retry_after(" 0.5 "), Some(Duration::from_millis(500)));
        assert_eq!(parse_retry_after("-1"), None);
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn test_display() {
        let err = ApiError::from_status("OpenAI", 400, "bad request".into(), None);
        assert_eq!(err.to_string(), "OpenAI API error: 400 - bad request");
    }
}
