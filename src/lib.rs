//! faqrank: Hybrid FAQ Retrieval
//!
//! Answers a natural-language question with the top-K FAQ documents, featuring:
//! - Dense kNN search over question+answer embeddings
//! - Boosted multi-field lexical search
//! - Reciprocal Rank Fusion (RRF) of both ranked lists
//! - Concurrent searches bounded by a deadline and cancellation
//! - Elasticsearch adapter and FAQ ingestion
//! - Prompt assembly for downstream answer generation

pub mod backend;
pub mod config;
pub mod embedding;
pub mod ingest;
pub mod prompt;
pub mod retrieval;
pub mod types;
pub mod util;

pub use config::Config;
pub use retrieval::{RetrievalError, RetrievalReport, Retriever};
pub use types::*;
