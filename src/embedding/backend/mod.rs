//! Embedder implementations
//!
//! `backend = "http"` talks to any OpenAI-compatible embeddings endpoint; the
//! FAQ index is built for `multi-qa-MiniLM-L6-cos-v1` (384 dimensions) served
//! by text-embeddings-inference or similar. `backend = "hash"` needs no
//! model and is meant for offline runs and tests.
//!
//! ```toml
//! [embedding]
//! backend = "http"
//! endpoint = "http://localhost:8080/v1/embeddings"
//! model = "multi-qa-MiniLM-L6-cos-v1"
//! dimensions = 384
//! ```

mod factory;
mod hash;
mod http;
mod traits;

pub use factory::create_backend;
pub use hash::HashBackend;
pub use http::{HttpBackend, HttpConfig};
pub use traits::{EmbeddingBackend, EmbeddingError, EmbeddingResult};
