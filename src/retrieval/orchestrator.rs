//! Retrieval orchestration
//!
//! Drives one query through embed → search → fuse → materialize. In hybrid
//! mode the vector branch (embed then kNN) and the lexical search run
//! concurrently; the whole call is bounded by the configured deadline and
//! an optional cancellation signal. Dropping the in-flight futures aborts
//! the outstanding backend requests.

use super::error::RetrievalError;
use super::fusion::{reciprocal_rank_fusion, RrfConfig};
use super::materializer::DocumentMaterializer;
use crate::backend::{BackendError, DocumentStore, ElasticBackend, SearchBackend};
use crate::config::{Config, PartialFailurePolicy, RetrievalConfig};
use crate::embedding::{create_backend, EmbeddingBackend, EmbeddingError};
use crate::types::{Document, Embedding, FusedResult, Query, RankedHit, RetrievalMode, RetrievalResult, SourceList};
use crate::util::truncate_str;
use anyhow::Context;
use serde::Serialize;
use std::future::{pending, Future};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Full outcome of one retrieval
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalReport {
    /// Mode the caller asked for
    pub mode: RetrievalMode,
    /// Fused top-K in final order
    pub fused: Vec<FusedResult>,
    /// Materialized documents, same order as `fused` minus vanished ids
    pub documents: RetrievalResult,
    /// Set when a hybrid query was answered from this list alone
    pub degraded_to: Option<SourceList>,
    pub elapsed_ms: u64,
}

impl RetrievalReport {
    /// Pair each document with its fusion entry
    pub fn scored(&self) -> impl Iterator<Item = (&Document, Option<&FusedResult>)> {
        self.documents
            .iter()
            .map(|doc| (doc, self.fused.iter().find(|f| f.document_id == doc.id)))
    }
}

/// Why the vector branch of a hybrid query failed
#[derive(Debug)]
enum VectorFailure {
    Embedding(EmbeddingError),
    Search(BackendError),
}

/// Ranked lists handed to fusion, plus the degradation marker
struct Lists {
    lists: Vec<Vec<RankedHit>>,
    degraded_to: Option<SourceList>,
}

impl Lists {
    fn both(vector: Vec<RankedHit>, lexical: Vec<RankedHit>) -> Self {
        Self {
            lists: vec![vector, lexical],
            degraded_to: None,
        }
    }

    fn only(list: SourceList, hits: Vec<RankedHit>) -> Self {
        Self {
            lists: vec![hits],
            degraded_to: Some(list),
        }
    }
}

/// Hybrid FAQ retriever
#[derive(Debug, Clone)]
pub struct Retriever {
    /// Ranked-list primitives
    search: Arc<dyn SearchBackend>,
    /// Document lookup for the fused ids
    materializer: DocumentMaterializer,
    /// Query encoder; hybrid queries without a precomputed vector need it
    embedder: Option<Arc<dyn EmbeddingBackend>>,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(
        search: Arc<dyn SearchBackend>,
        store: Arc<dyn DocumentStore>,
        embedder: Option<Arc<dyn EmbeddingBackend>>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            search,
            materializer: DocumentMaterializer::new(store),
            embedder,
            config,
        }
    }

    /// Build a retriever against Elasticsearch and the configured embedder
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let elastic = Arc::new(
            ElasticBackend::new(config.search.clone(), config.retrieval.field_boosts.clone())
                .context("Failed to create search backend")?,
        );
        let embedder = create_backend(&config.embedding).context("Failed to create embedding backend")?;

        Ok(Self::new(
            elastic.clone(),
            elastic,
            Some(embedder),
            config.retrieval.clone(),
        ))
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve the top-K documents for `text`
    pub async fn retrieve(&self, text: &str, mode: RetrievalMode) -> Result<RetrievalResult, RetrievalError> {
        let report = self.retrieve_query(&Query::new(text), mode).await?;
        Ok(report.documents)
    }

    /// Retrieve with the configured deadline and no external cancellation
    pub async fn retrieve_query(&self, query: &Query, mode: RetrievalMode) -> Result<RetrievalReport, RetrievalError> {
        self.retrieve_until(query, mode, pending::<()>()).await
    }

    /// Retrieve until done, the deadline elapses, or `cancel` resolves.
    ///
    /// Timeout and cancellation never yield partial results.
    pub async fn retrieve_until<C>(
        &self,
        query: &Query,
        mode: RetrievalMode,
        cancel: C,
    ) -> Result<RetrievalReport, RetrievalError>
    where
        C: Future<Output = ()>,
    {
        if query.is_blank() {
            return Err(RetrievalError::InvalidQuery("query text is empty".to_string()));
        }

        let deadline = self.config.timeout();
        tokio::select! {
            biased;
            _ = cancel => {
                warn!("Retrieval for '{}' cancelled", truncate_str(&query.text, 50));
                Err(RetrievalError::Cancelled)
            }
            outcome = tokio::time::timeout(deadline, self.run(query, mode)) => match outcome {
                Ok(result) => result,
                Err(_) => {
                    warn!("Retrieval for '{}' timed out after {:?}", truncate_str(&query.text, 50), deadline);
                    Err(RetrievalError::Timeout(deadline))
                }
            },
        }
    }

    async fn run(&self, query: &Query, mode: RetrievalMode) -> Result<RetrievalReport, RetrievalError> {
        let start = Instant::now();
        let depth = self.config.fetch_depth;

        let Lists { lists, degraded_to } = match mode {
            RetrievalMode::Lexical => {
                let hits = self.search.search_lexical(&query.text, depth).await?;
                debug!("Lexical search: {} hits", hits.len());
                Lists {
                    lists: vec![hits],
                    degraded_to: None,
                }
            }
            RetrievalMode::Hybrid => self.hybrid_lists(query, depth).await?,
        };

        let fused = reciprocal_rank_fusion(&lists, &RrfConfig::new(self.config.rrf_k), self.config.top_k);
        let documents = self.materializer.materialize(&fused).await?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        info!(
            "{} retrieval for '{}': {} results in {}ms{}",
            mode,
            truncate_str(&query.text, 50),
            documents.len(),
            elapsed_ms,
            degraded_to
                .map(|l| format!(" ({} only)", l))
                .unwrap_or_default()
        );

        Ok(RetrievalReport {
            mode,
            fused,
            documents,
            degraded_to,
            elapsed_ms,
        })
    }

    /// Run both searches concurrently and apply the failure policies
    async fn hybrid_lists(&self, query: &Query, depth: usize) -> Result<Lists, RetrievalError> {
        let vector_branch = async {
            let embedding = match &query.embedding {
                Some(embedding) => embedding.clone(),
                None => self.embed(&query.text).await.map_err(VectorFailure::Embedding)?,
            };
            self.search
                .search_vector(&embedding, depth)
                .await
                .map_err(VectorFailure::Search)
        };
        let lexical_branch = self.search.search_lexical(&query.text, depth);

        let (vector, lexical) = tokio::join!(vector_branch, lexical_branch);
        debug!(
            "Hybrid branches finished: vector={}, lexical={}",
            vector.as_ref().map(|h| h.len().to_string()).unwrap_or_else(|_| "failed".into()),
            lexical.as_ref().map(|h| h.len().to_string()).unwrap_or_else(|_| "failed".into()),
        );

        match (vector, lexical) {
            (Ok(vector), Ok(lexical)) => Ok(Lists::both(vector, lexical)),

            (Err(VectorFailure::Search(BackendError::DimensionMismatch { expected, actual })), _) => {
                Err(RetrievalError::DimensionMismatch { expected, actual })
            }

            (Err(VectorFailure::Embedding(err)), Ok(lexical)) => {
                if self.config.fallback_to_lexical {
                    warn!("Embedding failed, falling back to lexical: {}", err);
                    Ok(Lists::only(SourceList::Lexical, lexical))
                } else {
                    Err(err.into())
                }
            }

            (Err(VectorFailure::Search(err)), Ok(lexical)) => match self.config.partial_failure {
                PartialFailurePolicy::Degrade => {
                    warn!("Vector search failed, degrading to lexical: {}", err);
                    Ok(Lists::only(SourceList::Lexical, lexical))
                }
                PartialFailurePolicy::Fail => Err(err.into()),
            },

            (Ok(vector), Err(err)) => match self.config.partial_failure {
                PartialFailurePolicy::Degrade => {
                    warn!("Lexical search failed, degrading to vector: {}", err);
                    Ok(Lists::only(SourceList::Vector, vector))
                }
                PartialFailurePolicy::Fail => Err(err.into()),
            },

            (Err(vector_err), Err(lexical_err)) => {
                warn!("Lexical search also failed: {}", lexical_err);
                Err(match vector_err {
                    VectorFailure::Embedding(err) => err.into(),
                    VectorFailure::Search(err) => err.into(),
                })
            }
        }
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let embedder = self
            .embedder
            .as_ref()
            .ok_or_else(|| EmbeddingError::Config("no embedding backend configured".to_string()))?;
        embedder.embed(text).await
    }
}
