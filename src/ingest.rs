//! FAQ ingestion
//!
//! Loads FAQ records from a JSON file, embeds them and writes them to the
//! search index with the three vector fields the retriever can query.

use crate::backend::IndexWriter;
use crate::config::VECTOR_FIELDS;
use crate::embedding::EmbeddingBackend;
use crate::types::{DocumentId, Embedding};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Records embedded per `embed_batch` call (three texts each)
const RECORDS_PER_BATCH: usize = 32;

/// One FAQ entry as stored in the source JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqRecord {
    #[serde(rename = "Category", default)]
    pub category: String,
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Answer")]
    pub answer: String,
    /// Stable id; becomes the index `_id` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<DocumentId>,
}

impl FaqRecord {
    /// Question, answer and combined text, in `VECTOR_FIELDS` order
    fn embedding_texts(&self) -> [String; 3] {
        [
            self.question.clone(),
            self.answer.clone(),
            format!("{} {}", self.question, self.answer),
        ]
    }

    fn to_source(&self, vectors: &[Embedding]) -> Value {
        let mut source = Map::new();
        source.insert("Category".into(), json!(self.category));
        source.insert("Question".into(), json!(self.question));
        source.insert("Answer".into(), json!(self.answer));
        if let Some(doc_id) = &self.doc_id {
            source.insert("doc_id".into(), json!(doc_id));
        }
        for (field, vector) in VECTOR_FIELDS.iter().zip(vectors) {
            source.insert((*field).into(), json!(vector));
        }
        Value::Object(source)
    }
}

/// Load FAQ records from a JSON array file
pub fn load_documents(path: &Path) -> Result<Vec<FaqRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read FAQ file '{}'", path.display()))?;
    parse_documents(&content).with_context(|| format!("Invalid FAQ file '{}'", path.display()))
}

/// Parse and check FAQ records from JSON text
pub fn parse_documents(content: &str) -> Result<Vec<FaqRecord>> {
    let records: Vec<FaqRecord> = serde_json::from_str(content).context("Expected a JSON array of FAQ records")?;

    for (i, record) in records.iter().enumerate() {
        if record.question.trim().is_empty() {
            bail!("Record {} has an empty Question", i);
        }
        if record.answer.trim().is_empty() {
            bail!("Record {} has an empty Answer", i);
        }
    }

    Ok(records)
}

/// Outcome of one ingestion run
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    pub indexed: usize,
    pub recreated: bool,
    pub elapsed: Duration,
}

/// Embeds FAQ records and writes them to the index
#[derive(Debug, Clone)]
pub struct Ingestor {
    writer: Arc<dyn IndexWriter>,
    embedder: Arc<dyn EmbeddingBackend>,
}

impl Ingestor {
    pub fn new(writer: Arc<dyn IndexWriter>, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        Self { writer, embedder }
    }

    /// Index `records`, dropping and recreating the index first when `recreate` is set.
    ///
    /// `on_progress(done, total)` is called after every indexed record.
    pub async fn run<F>(&self, records: &[FaqRecord], recreate: bool, on_progress: F) -> Result<IngestStats>
    where
        F: Fn(usize, usize),
    {
        let start = Instant::now();
        let dims = self.writer.index_dimensions();
        if self.embedder.dimensions() != dims {
            bail!(
                "Embedder '{}' produces {} dimensions but the index expects {}",
                self.embedder.name(),
                self.embedder.dimensions(),
                dims
            );
        }

        let recreated = self.prepare_index(recreate).await?;
        let total = records.len();
        let mut indexed = 0;

        for batch in records.chunks(RECORDS_PER_BATCH) {
            let texts: Vec<String> = batch.iter().flat_map(FaqRecord::embedding_texts).collect();
            let vectors = self
                .embedder
                .embed_batch(&texts)
                .await
                .context("Failed to embed FAQ records")?;

            if vectors.len() != texts.len() {
                bail!("Embedder returned {} vectors for {} texts", vectors.len(), texts.len());
            }
            if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
                bail!("Embedder returned a {}-dimensional vector, expected {}", bad.len(), dims);
            }

            for (record, record_vectors) in batch.iter().zip(vectors.chunks(VECTOR_FIELDS.len())) {
                let id = self
                    .writer
                    .index_document(record.doc_id.as_deref(), &record.to_source(record_vectors))
                    .await
                    .with_context(|| format!("Failed to index record {}", indexed))?;
                debug!("Indexed '{}'", id);
                indexed += 1;
                on_progress(indexed, total);
            }
        }

        self.writer.refresh().await.context("Failed to refresh index")?;

        let stats = IngestStats {
            indexed,
            recreated,
            elapsed: start.elapsed(),
        };
        info!("Indexed {} FAQ records in {:?}", stats.indexed, stats.elapsed);
        Ok(stats)
    }

    /// Returns whether the index was (re)created
    async fn prepare_index(&self, recreate: bool) -> Result<bool> {
        if recreate {
            self.writer.delete_index().await.context("Failed to delete index")?;
        } else if self.writer.index_exists().await.context("Failed to check index")? {
            return Ok(false);
        }
        self.writer.create_index().await.context("Failed to create index")?;
        Ok(true)
    }
}
