//! Build the configured embedder

use super::hash::HashBackend;
use super::http::{HttpBackend, HttpConfig};
use super::traits::{EmbeddingBackend, EmbeddingResult};
use crate::config::EmbeddingConfig;
use std::sync::Arc;
use tracing::info;

/// Instantiate the backend selected by `[embedding] backend`
pub fn create_backend(config: &EmbeddingConfig) -> EmbeddingResult<Arc<dyn EmbeddingBackend>> {
    let backend: Arc<dyn EmbeddingBackend> = match config {
        EmbeddingConfig::Http { .. } => Arc::new(HttpBackend::new(HttpConfig::try_from(config)?)?),
        EmbeddingConfig::Hash { dimensions } => Arc::new(HashBackend::new(*dimensions)?),
    };
    info!(
        backend = backend.name(),
        dimensions = backend.dimensions(),
        "Embedding backend ready"
    );
    Ok(backend)
}
