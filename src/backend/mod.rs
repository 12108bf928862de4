//! Search Backend Client
//!
//! - [`SearchBackend`]: vector and lexical ranked-list primitives
//! - [`DocumentStore`]: full-document lookup by id
//! - [`IndexWriter`]: index lifecycle for ingestion
//! - [`ElasticBackend`]: Elasticsearch implementation of both

mod elastic;
pub mod query;
mod traits;

pub use elastic::ElasticBackend;
pub use traits::{BackendError, BackendResult, DocumentStore, IndexWriter, SearchBackend};
