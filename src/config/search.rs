//! Search backend (Elasticsearch) configuration

use serde::{Deserialize, Serialize};

/// Dense vector fields maintained for every indexed FAQ entry
pub const VECTOR_FIELDS: [&str; 3] = ["question_vector", "text_vector", "question_text_vector"];

/// Elasticsearch connection and index configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the cluster (overridden by `ELASTIC_URL`)
    #[serde(default = "default_url")]
    pub url: String,
    /// Index holding the FAQ documents
    #[serde(default = "default_index")]
    pub index: String,
    /// Dimensionality of the dense_vector fields
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    /// Vector field queried by kNN search
    #[serde(default = "default_vector_field")]
    pub vector_field: String,
    /// kNN candidates examined per shard
    #[serde(default = "default_num_candidates")]
    pub num_candidates: usize,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional API key, sent as `Authorization: ApiKey <key>`
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_index() -> String {
    "insights-questions".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_vector_field() -> String {
    "question_text_vector".to_string()
}

fn default_num_candidates() -> usize {
    10_000
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            index: default_index(),
            dimensions: default_dimensions(),
            vector_field: default_vector_field(),
            num_candidates: default_num_candidates(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
        }
    }
}
