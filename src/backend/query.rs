//! Elasticsearch request bodies and response shapes
//!
//! Kept free of I/O so the exact query language can be tested directly.

use crate::config::FieldBoost;
use crate::types::{Document, DocumentId};
use serde::Deserialize;
use serde_json::{json, Value};

/// Source fields never returned to callers
pub const EXCLUDED_SOURCE_FIELDS: [&str; 3] =
    ["question_vector", "text_vector", "question_text_vector"];

/// kNN search body
pub fn knn_body(field: &str, vector: &[f32], depth: usize, num_candidates: usize) -> Value {
    json!({
        "knn": {
            "field": field,
            "query_vector": vector,
            "k": depth,
            "num_candidates": num_candidates.max(depth),
        },
        "size": depth,
        "_source": false,
    })
}

/// Boosted best-fields multi_match body
pub fn lexical_body(text: &str, boosts: &[FieldBoost], depth: usize) -> Value {
    let fields: Vec<String> = boosts.iter().map(|b| b.to_string()).collect();
    json!({
        "size": depth,
        "_source": false,
        "query": {
            "bool": {
                "must": {
                    "multi_match": {
                        "query": text,
                        "fields": fields,
                        "type": "best_fields",
                    }
                }
            }
        }
    })
}

/// `_mget` body
pub fn mget_body(ids: &[DocumentId]) -> Value {
    json!({ "ids": ids })
}

/// Index settings and mappings for a FAQ index with `dims`-dimensional vectors
pub fn index_mapping(dims: usize) -> Value {
    let vector = json!({
        "type": "dense_vector",
        "dims": dims,
        "index": true,
        "similarity": "cosine",
    });
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0,
        },
        "mappings": {
            "properties": {
                "Answer": {"type": "text"},
                "Category": {"type": "text"},
                "Question": {"type": "text"},
                "doc_id": {"type": "keyword"},
                "question_vector": vector,
                "text_vector": vector,
                "question_text_vector": vector,
            }
        }
    })
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f32>,
}

impl SearchResponse {
    /// `(id, score)` pairs in response order
    pub fn into_scored_ids(self) -> Vec<(DocumentId, f32)> {
        self.hits
            .hits
            .into_iter()
            .map(|h| (h.id, h.score.unwrap_or(0.0)))
            .collect()
    }
}

/// One `_doc` / `_mget` entry
#[derive(Debug, Deserialize)]
pub struct DocEntry {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub found: bool,
    #[serde(rename = "_source", default)]
    pub source: Option<serde_json::Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub struct MgetResponse {
    pub docs: Vec<DocEntry>,
}

impl DocEntry {
    /// Convert a found entry into a `Document`; `None` when missing
    pub fn into_document(self) -> Option<Document> {
        if !self.found {
            return None;
        }
        let mut source = self.source.unwrap_or_default();
        let mut take = |key: &str| match source.remove(key) {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let category = take("Category");
        let question = take("Question");
        let answer = take("Answer");
        for field in EXCLUDED_SOURCE_FIELDS {
            source.remove(field);
        }
        Some(Document {
            id: self.id,
            category,
            question,
            answer,
            metadata: if source.is_empty() { None } else { Some(source) },
        })
    }
}

/// Pull `error.reason` out of an Elasticsearch error body
pub fn error_reason(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/root_cause/0/reason")
                .or_else(|| v.pointer("/error/reason"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}
