use std::time::Duration;
use thiserror::Error;

/// Failures raised by the API layer.
///
/// None of these ever escape [`crate::resolver::VoteResolver`]; the resolver
/// degrades to a conservative answer instead.
#[derive(Debug, Clone, Error)]
pub enum ResolverError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response body: {0}")]
    Parse(String),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ResolverError {
    /// Transient faults worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ResolverError::Network(_) | ResolverError::Timeout(_) => true,
            ResolverError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ResolverError {
    fn from(err: reqwest::Error) -> Self {
        ResolverError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ResolverError {
    fn from(err: serde_json::Error) -> Self {
        ResolverError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ResolverError::Network("reset".into()).is_retryable());
        assert!(ResolverError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(ResolverError::Http { status: 503, url: "u".into() }.is_retryable());
        assert!(ResolverError::Http { status: 429, url: "u".into() }.is_retryable());

        assert!(!ResolverError::Http { status: 404, url: "u".into() }.is_retryable());
        assert!(!ResolverError::Parse("eof".into()).is_retryable());
        assert!(!ResolverError::Configuration("x".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = ResolverError::Http { status: 502, url: "http://x/y".into() };
        assert_eq!(err.to_string(), "HTTP 502 from http://x/y");
    }
}
