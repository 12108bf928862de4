//! Hybrid retrieval
//!
//! Combines:
//! - Dense vector search (kNN on the question+answer embedding)
//! - Boosted multi-field lexical search
//! - Reciprocal Rank Fusion (RRF) for score aggregation
//! - Document materialization in fused order

mod error;
mod fusion;
mod materializer;
mod orchestrator;

pub use error::*;
pub use fusion::*;
pub use materializer::*;
pub use orchestrator::*;
