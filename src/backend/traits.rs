//! Search backend trait definitions
//!
//! The core only needs two ranked-list primitives and a document lookup;
//! everything backend-specific stays behind these traits.

use crate::types::{Document, DocumentId, RankedHit};
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use std::fmt::Debug;

/// Errors reported by a search backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Backend unreachable, timed out, or failing server-side
    #[error("Search backend unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected the query
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Query vector does not match the index dimensionality
    #[error("Vector dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Document vanished between search and fetch
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Response body could not be understood
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Unavailable(err.to_string())
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Ranked-list search primitives
#[async_trait]
pub trait SearchBackend: Send + Sync + Debug {
    /// Approximate nearest-neighbour search.
    ///
    /// Fails with `DimensionMismatch` when `vector.len() != self.dimensions()`.
    async fn search_vector(&self, vector: &[f32], depth: usize) -> BackendResult<Vec<RankedHit>>;

    /// Boosted multi-field keyword search
    async fn search_lexical(&self, text: &str, depth: usize) -> BackendResult<Vec<RankedHit>>;

    /// Configured vector dimensionality of the index
    fn dimensions(&self) -> usize;

    /// Backend name (e.g., "elasticsearch")
    fn name(&self) -> &str;
}

/// Document lookup by id
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Fetch one document; `DocumentNotFound` if it does not exist
    async fn get(&self, id: &str) -> BackendResult<Document>;

    /// Fetch several documents, one result per id in input order.
    ///
    /// The default issues the lookups concurrently.
    async fn get_batch(&self, ids: &[DocumentId]) -> Vec<BackendResult<Document>> {
        join_all(ids.iter().map(|id| self.get(id))).await
    }
}

/// Index lifecycle and writes used by ingestion
#[async_trait]
pub trait IndexWriter: Send + Sync + Debug {
    /// Vector dimensionality the index is created with
    fn index_dimensions(&self) -> usize;

    async fn index_exists(&self) -> BackendResult<bool>;

    async fn create_index(&self) -> BackendResult<()>;

    /// Drop the index; succeeds when it does not exist
    async fn delete_index(&self) -> BackendResult<()>;

    /// Store one source document, returning its id
    async fn index_document(&self, id: Option<&str>, source: &Value) -> BackendResult<DocumentId>;

    /// Make recent writes visible to search
    async fn refresh(&self) -> BackendResult<()>;
}
