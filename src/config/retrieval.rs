//! Retrieval and fusion configuration

use crate::types::RetrievalMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Boost applied to one field of the lexical multi-field query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBoost {
    pub field: String,
    pub boost: f32,
}

impl FieldBoost {
    pub fn new(field: impl Into<String>, boost: f32) -> Self {
        Self {
            field: field.into(),
            boost,
        }
    }
}

/// Renders Elasticsearch `field^boost` syntax
impl fmt::Display for FieldBoost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}^{}", self.field, self.boost)
    }
}

/// What to do when exactly one of the two hybrid searches fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartialFailurePolicy {
    /// Fuse the list that succeeded
    #[default]
    Degrade,
    /// Propagate the failure
    Fail,
}

/// Retrieval configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Default mode when the caller does not pick one
    #[serde(default)]
    pub mode: RetrievalMode,
    /// Hits requested from each ranked list
    #[serde(default = "default_fetch_depth")]
    pub fetch_depth: usize,
    /// Documents returned after fusion
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// RRF smoothing constant
    #[serde(default = "default_rrf_k")]
    pub rrf_k: usize,
    /// Lexical field boosts; the first entry is the primary field
    #[serde(default = "default_field_boosts")]
    pub field_boosts: Vec<FieldBoost>,
    /// Deadline for one whole retrieval
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// On embedder failure, continue with lexical-only fusion
    #[serde(default)]
    pub fallback_to_lexical: bool,
    /// Policy when one hybrid search fails
    #[serde(default)]
    pub partial_failure: PartialFailurePolicy,
}

fn default_fetch_depth() -> usize {
    10
}

fn default_top_k() -> usize {
    5
}

fn default_rrf_k() -> usize {
    60
}

fn default_timeout_ms() -> u64 {
    5_000
}

pub fn default_field_boosts() -> Vec<FieldBoost> {
    vec![
        FieldBoost::new("Question", 3.0),
        FieldBoost::new("Answer", 1.0),
        FieldBoost::new("Category", 1.0),
    ]
}

impl RetrievalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            mode: RetrievalMode::default(),
            fetch_depth: default_fetch_depth(),
            top_k: default_top_k(),
            rrf_k: default_rrf_k(),
            field_boosts: default_field_boosts(),
            timeout_ms: default_timeout_ms(),
            fallback_to_lexical: false,
            partial_failure: PartialFailurePolicy::default(),
        }
    }
}
