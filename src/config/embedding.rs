//! Embedding backend configuration

use serde::{Deserialize, Serialize};

/// Default timeout for HTTP backend requests
fn default_timeout() -> u64 {
    30
}

/// Default batch size for HTTP backend requests
fn default_batch_size() -> usize {
    100
}

fn default_dimensions() -> usize {
    384
}

/// Embedding provider configuration
///
/// ```toml
/// [embedding]
/// backend = "http"
/// endpoint = "http://localhost:8080/v1/embeddings"
/// model = "multi-qa-MiniLM-L6-cos-v1"
/// dimensions = 384
/// ```
///
/// or, for offline use:
///
/// ```toml
/// [embedding]
/// backend = "hash"
/// dimensions = 384
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum EmbeddingConfig {
    /// OpenAI-compatible HTTP endpoint
    Http {
        /// API endpoint URL
        endpoint: String,
        /// API key (optional, can also use OPENAI_API_KEY env var)
        #[serde(default)]
        api_key: Option<String>,
        /// Model name sent with each request
        model: String,
        /// Embedding dimensions
        #[serde(default = "default_dimensions")]
        dimensions: usize,
        /// Request timeout in seconds
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
        /// Maximum batch size for requests
        #[serde(default = "default_batch_size")]
        max_batch_size: usize,
    },
    /// Deterministic token-hash embeddings, no network
    Hash {
        #[serde(default = "default_dimensions")]
        dimensions: usize,
    },
}

impl EmbeddingConfig {
    /// Configured output dimensionality
    pub fn dimensions(&self) -> usize {
        match self {
            Self::Http { dimensions, .. } | Self::Hash { dimensions } => *dimensions,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Hash { .. } => "hash",
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::Http {
            endpoint: "http://localhost:8080/v1/embeddings".to_string(),
            api_key: None,
            model: "multi-qa-MiniLM-L6-cos-v1".to_string(),
            dimensions: default_dimensions(),
            timeout_secs: default_timeout(),
            max_batch_size: default_batch_size(),
        }
    }
}
