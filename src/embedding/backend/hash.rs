//! Deterministic hash embeddings
//!
//! Feature-hashes lowercase word tokens (FNV-1a) into a fixed number of
//! buckets. No model or network needed, so it is used for offline
//! development and tests. Similar wording gives similar vectors; it has no
//! semantic understanding beyond shared tokens.

use super::traits::{normalize_embedding, require_text, EmbeddingBackend, EmbeddingError, EmbeddingResult};
use crate::types::Embedding;
use async_trait::async_trait;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

/// Hash embedder backend
#[derive(Debug, Clone)]
pub struct HashBackend {
    dimensions: usize,
}

impl HashBackend {
    pub fn new(dimensions: usize) -> EmbeddingResult<Self> {
        if dimensions == 0 {
            return Err(EmbeddingError::Config(
                "hash backend dimensions must be positive".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    fn embed_sync(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(token.to_lowercase().as_bytes());
            let bucket = (hash % self.dimensions as u64) as usize;
            // High bit picks the sign so collisions partly cancel
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        normalize_embedding(&vector)
    }
}

#[async_trait]
impl EmbeddingBackend for HashBackend {
    async fn embed(&self, text: &str) -> EmbeddingResult<Embedding> {
        Ok(self.embed_sync(require_text(text)?))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_hash_embedding_is_deterministic_and_normalized() {
        let backend = HashBackend::new(64).unwrap();
        let a = backend.embed("How do I reset my password?").await.unwrap();
        let b = backend.embed("How do I reset my password?").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_shared_tokens_are_closer() {
        let backend = HashBackend::new(384).unwrap();
        let query = backend.embed("reset password").await.unwrap();
        let near = backend.embed("How to reset a forgotten password").await.unwrap();
        let far = backend.embed("Quarterly market share by region").await.unwrap();
        assert!(cosine(&query, &near) > cosine(&query, &far));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(HashBackend::new(0).is_err());
    }

    #[tokio::test]
    async fn test_blank_text_rejected() {
        let backend = HashBackend::new(8).unwrap();
        assert!(matches!(
            backend.embed("").await,
            Err(EmbeddingError::InvalidInput(_))
        ));
    }
}
