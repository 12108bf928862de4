//! Query and document embedding
//!
//! The embedder is an external collaborator: the retrieval core only sees
//! the [`EmbeddingBackend`] trait.

pub mod backend;

pub use backend::{
    create_backend, EmbeddingBackend, EmbeddingError, EmbeddingResult, HashBackend, HttpBackend,
    HttpConfig,
};
