//! Document materialization
//!
//! Fetches full documents for the fused top-K ids. Output order always
//! follows the fused order. Documents deleted between search and fetch are
//! skipped with a warning, so the result may be shorter than K.

use super::error::RetrievalError;
use crate::backend::{BackendError, DocumentStore};
use crate::types::{Document, DocumentId, FusedResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns fused ids into documents
#[derive(Debug, Clone)]
pub struct DocumentMaterializer {
    store: Arc<dyn DocumentStore>,
}

impl DocumentMaterializer {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch documents for `fused`, preserving its order
    pub async fn materialize(&self, fused: &[FusedResult]) -> Result<Vec<Document>, RetrievalError> {
        let ids: Vec<DocumentId> = fused.iter().map(|f| f.document_id.clone()).collect();
        self.materialize_ids(&ids).await
    }

    /// Fetch documents for `ids`, preserving their order
    pub async fn materialize_ids(&self, ids: &[DocumentId]) -> Result<Vec<Document>, RetrievalError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let fetched = self.store.get_batch(ids).await;
        let mut documents = Vec::with_capacity(ids.len());

        for (id, result) in ids.iter().zip(fetched) {
            match result {
                Ok(doc) => documents.push(doc),
                Err(BackendError::DocumentNotFound(_)) => {
                    warn!("Document '{}' disappeared before fetch, skipping", id);
                }
                Err(e) => return Err(e.into()),
            }
        }

        debug!("Materialized {}/{} documents", documents.len(), ids.len());
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendResult;
    use async_trait::async_trait;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct MapStore {
        docs: HashMap<String, Document>,
        broken: bool,
    }

    impl MapStore {
        fn with(ids: &[&str]) -> Self {
            let docs = ids
                .iter()
                .map(|id| {
                    let doc = Document::new(*id, "General", format!("Q {}", id), "A");
                    (id.to_string(), doc)
                })
                .collect();
            Self { docs, broken: false }
        }
    }

    #[async_trait]
    impl DocumentStore for MapStore {
        async fn get(&self, id: &str) -> BackendResult<Document> {
            if self.broken {
                return Err(BackendError::Unavailable("down".to_string()));
            }
            self.docs
                .get(id)
                .cloned()
                .ok_or_else(|| BackendError::DocumentNotFound(id.to_string()))
        }
    }

    fn ids(list: &[&str]) -> Vec<DocumentId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_preserves_input_order() {
        let m = DocumentMaterializer::new(Arc::new(MapStore::with(&["a", "b", "c"])));
        let docs = m.materialize_ids(&ids(&["c", "a", "b"])).await.unwrap();
        let got: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(got, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_skips_missing_documents() {
        let m = DocumentMaterializer::new(Arc::new(MapStore::with(&["a", "c"])));
        let docs = m.materialize_ids(&ids(&["a", "b", "c"])).await.unwrap();
        let got: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(got, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let mut store = MapStore::with(&["a"]);
        store.broken = true;
        let m = DocumentMaterializer::new(Arc::new(store));
        let err = m.materialize_ids(&ids(&["a"])).await.unwrap_err();
        assert!(matches!(err, RetrievalError::BackendUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let m = DocumentMaterializer::new(Arc::new(MapStore::default()));
        assert!(m.materialize(&[]).await.unwrap().is_empty());
    }
}
