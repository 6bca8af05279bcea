//! Error types for the ranking core and its collaborators.

use std::time::Duration;

use crate::search::types::Category;

/// Failure reported by an embedding provider.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Model initialization failed: {0}")]
    InitFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Invalid model name: {0}")]
    InvalidModel(String),

    #[error("Malformed embedding: expected {expected} dimensions, got {got}")]
    Malformed { expected: usize, got: usize },

    #[error("Embedding call timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure reported by a vector index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Cannot store or search with zero-norm vector")]
    ZeroNormVector,

    #[error("Duplicate product id: {0}")]
    DuplicateId(String),

    #[error("Index call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Index backend error: {0}")]
    Backend(String),
}

/// Payload-free discriminant of [`SearchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidQuery,
    InvalidCategory,
    InvalidPriceRange,
    EmbeddingFailure,
    IndexUnavailable,
    ProductNotFound,
}

/// Errors returned by [`SearchService`](crate::search::SearchService).
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid category: {0}. Valid categories are: {}", Category::names())]
    InvalidCategory(String),

    #[error("Invalid price range: min_price {min} is greater than max_price {max}")]
    InvalidPriceRange { min: f64, max: f64 },

    #[error("Embedding provider failed: {0}")]
    EmbeddingFailure(#[source] EmbeddingError),

    #[error("Vector index unavailable during {operation}: {source}")]
    IndexUnavailable {
        operation: &'static str,
        #[source]
        source: IndexError,
    },

    #[error("Product not found: {0}")]
    ProductNotFound(String),
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::InvalidQuery(_) => ErrorKind::InvalidQuery,
            SearchError::InvalidCategory(_) => ErrorKind::InvalidCategory,
            SearchError::InvalidPriceRange { .. } => ErrorKind::InvalidPriceRange,
            SearchError::EmbeddingFailure(_) => ErrorKind::EmbeddingFailure,
            SearchError::IndexUnavailable { .. } => ErrorKind::IndexUnavailable,
            SearchError::ProductNotFound(_) => ErrorKind::ProductNotFound,
        }
    }

    /// External-call failures are worth retrying; validation errors and
    /// missing products are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::EmbeddingFailure | ErrorKind::IndexUnavailable
        )
    }
}
