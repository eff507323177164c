//! Error types for BidIQ.
//!
//! Library crates use [`BidIqError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all BidIQ operations.
#[derive(Debug, thiserror::Error)]
pub enum BidIqError {
    /// Settings file unreadable or invalid, or API key missing.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure talking to an upstream service.
    #[error("network error: {0}")]
    Network(String),

    /// Upstream signalled quota exhaustion (HTTP 429).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Upstream answered with a non-success status other than 429.
    #[error("upstream error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    /// Response body or model output could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Document analysis failed for a reason other than rate limiting.
    #[error("{0}")]
    Analysis(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// `Result` specialised to [`BidIqError`].
pub type Result<T> = std::result::Result<T, BidIqError>;

impl BidIqError {
    /// [`BidIqError::Config`] with `msg`.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// [`BidIqError::Parse`] with `msg`.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// [`BidIqError::Validation`] with `msg`.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Attach the failing `path` to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the upstream quota is exhausted.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = BidIqError::config("analysis.max_chunk_size must be positive");
        assert_eq!(
            err.to_string(),
            "config error: analysis.max_chunk_size must be positive"
        );

        let err = BidIqError::Upstream {
            status: 503,
            message: "service unavailable".into(),
        };
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[test]
    fn rate_limit_classification() {
        assert!(BidIqError::RateLimited("429 Too Many Requests".into()).is_rate_limited());
        assert!(!BidIqError::Network("429 in a hostname".into()).is_rate_limited());
        assert!(
            !BidIqError::Upstream {
                status: 500,
                message: "429".into()
            }
            .is_rate_limited()
        );
    }
}
