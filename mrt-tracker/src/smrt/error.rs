//! Upstream fetch error types.

use crate::pool::PoolError;

/// Errors from fetching arrival data.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not decode
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Status the upstream returns spuriously; worth retrying
    #[error("transient status {status} for {unit}")]
    Transient { status: u16, unit: String },

    /// Status that will not improve on retry
    #[error("unrecoverable status {status} for {unit}")]
    Unrecoverable { status: u16, unit: String },

    /// A record without a platform id, the upstream's way of saying "miss"
    #[error("invalid record {index} for {unit}")]
    InvalidRecord { unit: String, index: usize },

    /// The batch deadline passed
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The fetch was cancelled
    #[error("cancelled")]
    Cancelled,

    /// `max_tries` was zero
    #[error("max tries must be at least 1")]
    NoTries,
}

impl FetchError {
    /// Whether another attempt at the same unit may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Http(_)
                | FetchError::Json { .. }
                | FetchError::Transient { .. }
                | FetchError::InvalidRecord { .. }
        )
    }
}

impl From<PoolError<FetchError>> for FetchError {
    fn from(err: PoolError<FetchError>) -> Self {
        match err {
            PoolError::Unit(e) => e,
            PoolError::Cancelled => FetchError::Cancelled,
            PoolError::DeadlineExceeded => FetchError::DeadlineExceeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::Transient {
            status: 404,
            unit: "Kranji".into(),
        };
        assert_eq!(err.to_string(), "transient status 404 for Kranji");

        let err = FetchError::Unrecoverable {
            status: 500,
            unit: "Kranji".into(),
        };
        assert_eq!(err.to_string(), "unrecoverable status 500 for Kranji");

        let err = FetchError::InvalidRecord {
            unit: "Nowhere".into(),
            index: 0,
        };
        assert_eq!(err.to_string(), "invalid record 0 for Nowhere");
    }

    #[test]
    fn retry_classification() {
        assert!(
            FetchError::Json {
                message: "eof".into(),
                body: None
            }
            .is_retryable()
        );
        assert!(
            FetchError::Transient {
                status: 404,
                unit: "x".into()
            }
            .is_retryable()
        );
        assert!(
            !FetchError::Unrecoverable {
                status: 403,
                unit: "x".into()
            }
            .is_retryable()
        );
        assert!(!FetchError::DeadlineExceeded.is_retryable());
        assert!(!FetchError::Cancelled.is_retryable());
    }

    #[test]
    fn from_pool_error() {
        assert!(matches!(
            FetchError::from(PoolError::Cancelled),
            FetchError::Cancelled
        ));
        assert!(matches!(
            FetchError::from(PoolError::DeadlineExceeded),
            FetchError::DeadlineExceeded
        ));
        assert!(matches!(
            FetchError::from(PoolError::Unit(FetchError::NoTries)),
            FetchError::NoTries
        ));
    }
}
