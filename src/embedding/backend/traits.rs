//! The embedder seam used by retrieval and ingestion

use crate::types::Embedding;
use async_trait::async_trait;
use std::fmt::Debug;

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// Blank or otherwise unusable input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The provider answered, but not with usable vectors
    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    /// HTTP 429 from the provider
    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Missing or unusable embedder settings
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Turns FAQ questions and answers into dense vectors.
///
/// Vectors are unit length and exactly `dimensions()` long, so they can be
/// compared against the index with cosine similarity. Implementations are
/// shared behind `Arc<dyn EmbeddingBackend>`.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync + Debug {
    async fn embed(&self, text: &str) -> EmbeddingResult<Embedding>;

    /// Embed several texts, one vector per input in input order.
    ///
    /// Falls back to sequential `embed` calls; backends with a batch
    /// endpoint override it.
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize;

    /// Short identifier used in logs
    fn name(&self) -> &str;
}

/// Reject whitespace-only text before it reaches a provider
pub(crate) fn require_text(text: &str) -> EmbeddingResult<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EmbeddingError::InvalidInput("empty text".to_string()));
    }
    Ok(trimmed)
}

/// Scale a vector to unit length; the zero vector is returned unchanged
pub(crate) fn normalize_embedding(vector: &[f32]) -> Embedding {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return vector.to_vec();
    }
    vector.iter().map(|x| x / norm).collect()
}
