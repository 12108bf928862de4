//! Core types for the retrieval pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier of a document, unique within an index
pub type DocumentId = String;

/// Embedding vector type
pub type Embedding = Vec<f32>;

// ============================================================================
// Query
// ============================================================================

/// A single retrieval request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Raw user question
    pub text: String,
    /// Precomputed embedding; skips the embedder when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Embedding>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// True when the text has no searchable content
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

// ============================================================================
// Ranked lists
// ============================================================================

/// Which ranked list a hit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceList {
    Vector,
    Lexical,
}

impl SourceList {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Lexical => "lexical",
        }
    }
}

impl fmt::Display for SourceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a backend-ranked list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHit {
    pub document_id: DocumentId,
    /// 1-based position within the originating list
    pub source_rank: usize,
    pub source_list: SourceList,
    /// Backend-native relevance score, informational only
    pub backend_score: f32,
}

/// Fused ranking entry: one per distinct document across all input lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedResult {
    pub document_id: DocumentId,
    /// Sum of `1 / (k + rank)` over every list the document appeared in
    pub rrf_score: f64,
    /// Rank in the vector list, if present there
    pub vector_rank: Option<usize>,
    /// Rank in the lexical list, if present there
    pub lexical_rank: Option<usize>,
}

impl FusedResult {
    /// Smallest rank across the lists the document appeared in
    pub fn min_rank(&self) -> usize {
        match (self.vector_rank, self.lexical_rank) {
            (Some(v), Some(l)) => v.min(l),
            (Some(v), None) => v,
            (None, Some(l)) => l,
            (None, None) => usize::MAX,
        }
    }

    pub fn in_vector_list(&self) -> bool {
        self.vector_rank.is_some()
    }

    /// Lists that contributed to this document's score
    pub fn matched_by(&self) -> Vec<SourceList> {
        let mut lists = Vec::with_capacity(2);
        if self.vector_rank.is_some() {
            lists.push(SourceList::Vector);
        }
        if self.lexical_rank.is_some() {
            lists.push(SourceList::Lexical);
        }
        lists
    }
}

// ============================================================================
// Documents
// ============================================================================

/// A FAQ entry as stored in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Backend document id (`_id`)
    pub id: DocumentId,
    #[serde(rename = "Category", default)]
    pub category: String,
    #[serde(rename = "Question", default)]
    pub question: String,
    #[serde(rename = "Answer", default)]
    pub answer: String,
    /// Remaining source fields not covered above (e.g. `doc_id`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            question: question.into(),
            answer: answer.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.into(), value);
        self
    }
}

/// Ordered retrieval output, length <= K, in fusion order
pub type RetrievalResult = Vec<Document>;

// ============================================================================
// Mode
// ============================================================================

/// Which lists a retrieval consults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    /// Keyword search only; the embedder is never called
    Lexical,
    /// Vector + keyword search fused with RRF
    #[default]
    Hybrid,
}

impl RetrievalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lexical" | "text" => Ok(Self::Lexical),
            "hybrid" | "vector" => Ok(Self::Hybrid),
            other => Err(format!("unknown retrieval mode '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_rank() {
        let fused = FusedResult {
            document_id: "a".to_string(),
            rrf_score: 0.0,
            vector_rank: Some(4),
            lexical_rank: Some(2),
        };
        assert_eq!(fused.min_rank(), 2);
        assert_eq!(fused.matched_by(), vec![SourceList::Vector, SourceList::Lexical]);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("lexical".parse::<RetrievalMode>().unwrap(), RetrievalMode::Lexical);
        assert_eq!("HYBRID".parse::<RetrievalMode>().unwrap(), RetrievalMode::Hybrid);
        // Labels shown by the chat front end
        assert_eq!("Text".parse::<RetrievalMode>().unwrap(), RetrievalMode::Lexical);
        assert_eq!("Vector".parse::<RetrievalMode>().unwrap(), RetrievalMode::Hybrid);
        assert!("semantic".parse::<RetrievalMode>().is_err());
    }

    #[test]
    fn test_document_serde_field_names() {
        let doc = Document::new("1", "Billing", "How do I pay?", "By card.");
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["Question"], "How do I pay?");
        assert_eq!(value["Category"], "Billing");
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_blank_query() {
        assert!(Query::new("   \n").is_blank());
        assert!(!Query::new("refund").is_blank());
    }
}
