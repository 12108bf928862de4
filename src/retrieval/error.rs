//! Retrieval error taxonomy

use crate::backend::BackendError;
use crate::embedding::EmbeddingError;
use std::time::Duration;

/// Errors surfaced by [`Retriever`](super::Retriever)
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// Empty or malformed query, rejected before any backend call
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Embedder failed in hybrid mode
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Search backend unreachable or failing; the caller decides on retries
    #[error("Search backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Query vector size differs from the index configuration
    #[error("Vector dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// External cancellation while a backend call was outstanding
    #[error("Retrieval cancelled")]
    Cancelled,

    /// Deadline elapsed while a backend call was outstanding
    #[error("Retrieval timed out after {0:?}")]
    Timeout(Duration),
}

impl From<BackendError> for RetrievalError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::InvalidQuery(reason) => Self::InvalidQuery(reason),
            BackendError::DimensionMismatch { expected, actual } => {
                Self::DimensionMismatch { expected, actual }
            }
            BackendError::Unavailable(reason) | BackendError::MalformedResponse(reason) => {
                Self::BackendUnavailable(reason)
            }
            // Only reachable if a caller converts a lookup miss explicitly
            err @ BackendError::DocumentNotFound(_) => Self::BackendUnavailable(err.to_string()),
        }
    }
}

impl RetrievalError {
    /// Whether a caller-level retry could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BackendUnavailable(_)
                | Self::Timeout(_)
                | Self::Embedding(EmbeddingError::RateLimited { .. })
                | Self::Embedding(EmbeddingError::Network(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_mapping() {
        let mapped: RetrievalError = BackendError::DimensionMismatch {
            expected: 384,
            actual: 768,
        }
        .into();
        assert!(matches!(
            mapped,
            RetrievalError::DimensionMismatch {
                expected: 384,
                actual: 768
            }
        ));
        assert!(!mapped.is_retryable());

        let mapped: RetrievalError = BackendError::Unavailable("connection refused".into()).into();
        assert!(matches!(mapped, RetrievalError::BackendUnavailable(_)));
        assert!(mapped.is_retryable());

        let mapped: RetrievalError = BackendError::InvalidQuery("bad".into()).into();
        assert!(matches!(mapped, RetrievalError::InvalidQuery(_)));
    }
}
