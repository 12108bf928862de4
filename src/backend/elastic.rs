//! Elasticsearch adapter
//!
//! Implements [`SearchBackend`] and [`DocumentStore`] over the REST API with a
//! single pooled `reqwest::Client`, plus the index management used by ingestion.

use super::query::{
    error_reason, index_mapping, knn_body, lexical_body, mget_body, DocEntry, MgetResponse,
    SearchResponse, EXCLUDED_SOURCE_FIELDS,
};
use super::traits::{BackendError, BackendResult, DocumentStore, IndexWriter, SearchBackend};
use crate::config::{FieldBoost, SearchConfig};
use crate::retrieval::to_ranked_hits;
use crate::types::{Document, DocumentId, RankedHit, SourceList};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Elasticsearch-backed search and document store
#[derive(Debug, Clone)]
pub struct ElasticBackend {
    client: Client,
    base_url: String,
    config: SearchConfig,
    field_boosts: Vec<FieldBoost>,
}

impl ElasticBackend {
    /// Create a new adapter. No request is made until the first call.
    pub fn new(config: SearchConfig, field_boosts: Vec<FieldBoost>) -> BackendResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("ApiKey {}", key))
                    .map_err(|e| BackendError::InvalidQuery(format!("Invalid API key format: {}", e)))?,
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| BackendError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        info!(
            "Elasticsearch backend: url={}, index={}, vector_field={}",
            config.url, config.index, config.vector_field
        );

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            config,
            field_boosts,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.config.index
    }

    fn index_url(&self, suffix: &str) -> String {
        format!("{}/{}{}", self.base_url, self.config.index, suffix)
    }

    /// `{index}/_doc/{id}` with `id` percent-encoded as a single path segment
    fn doc_url(&self, id: &str) -> BackendResult<Url> {
        // Url drops dot segments instead of encoding them
        if id.is_empty() || id == "." || id == ".." {
            return Err(BackendError::InvalidQuery(format!("unusable document id '{}'", id)));
        }
        let mut url = Url::parse(&self.index_url("/_doc"))
            .map_err(|e| BackendError::InvalidQuery(format!("bad search url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidQuery("search url cannot be a base".to_string()))?
            .push(id);
        Ok(url)
    }

    async fn search(&self, body: &Value) -> BackendResult<Vec<(DocumentId, f32)>> {
        let response = self
            .client
            .post(self.index_url("/_search"))
            .json(body)
            .send()
            .await?;
        let parsed: SearchResponse = parse_json(response).await?;
        Ok(parsed.into_scored_ids())
    }
}

#[async_trait]
impl IndexWriter for ElasticBackend {
    fn index_dimensions(&self) -> usize {
        self.config.dimensions
    }

    /// Whether the configured index exists
    async fn index_exists(&self) -> BackendResult<bool> {
        let response = self.client.head(self.index_url("")).send().await?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => Err(BackendError::Unavailable(format!("HEAD index returned {}", s))),
        }
    }

    /// Create the index with the FAQ mapping
    async fn create_index(&self) -> BackendResult<()> {
        let response = self
            .client
            .put(self.index_url(""))
            .json(&index_mapping(self.config.dimensions))
            .send()
            .await?;
        check_status(response).await?;
        info!("Created index '{}'", self.config.index);
        Ok(())
    }

    /// Delete the index; a missing index is not an error
    async fn delete_index(&self) -> BackendResult<()> {
        let response = self.client.delete(self.index_url("")).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check_status(response).await?;
        info!("Deleted index '{}'", self.config.index);
        Ok(())
    }

    /// Index one source document, returning the assigned `_id`
    async fn index_document(&self, id: Option<&str>, source: &Value) -> BackendResult<DocumentId> {
        let request = match id {
            Some(id) => self.client.put(self.doc_url(id)?),
            None => self.client.post(self.index_url("/_doc")),
        };
        let response = request.json(source).send().await?;
        let body: Value = parse_json(response).await?;
        body.get("_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| BackendError::MalformedResponse("index response without _id".to_string()))
    }

    /// Make recent writes searchable
    async fn refresh(&self) -> BackendResult<()> {
        let response = self.client.post(self.index_url("/_refresh")).send().await?;
        check_status(response).await
    }
}

#[async_trait]
impl SearchBackend for ElasticBackend {
    async fn search_vector(&self, vector: &[f32], depth: usize) -> BackendResult<Vec<RankedHit>> {
        if vector.len() != self.config.dimensions {
            return Err(BackendError::DimensionMismatch {
                expected: self.config.dimensions,
                actual: vector.len(),
            });
        }
        let body = knn_body(
            &self.config.vector_field,
            vector,
            depth,
            self.config.num_candidates,
        );
        let mut scored = self.search(&body).await?;
        scored.truncate(depth);
        debug!("Vector search: {} hits", scored.len());
        Ok(to_ranked_hits(&scored, SourceList::Vector))
    }

    async fn search_lexical(&self, text: &str, depth: usize) -> BackendResult<Vec<RankedHit>> {
        if text.trim().is_empty() {
            return Err(BackendError::InvalidQuery("empty query text".to_string()));
        }
        let body = lexical_body(text, &self.field_boosts, depth);
        let mut scored = self.search(&body).await?;
        scored.truncate(depth);
        debug!("Lexical search: {} hits", scored.len());
        Ok(to_ranked_hits(&scored, SourceList::Lexical))
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "elasticsearch"
    }
}

#[async_trait]
impl DocumentStore for ElasticBackend {
    async fn get(&self, id: &str) -> BackendResult<Document> {
        let response = self
            .client
            .get(self.doc_url(id)?)
            .query(&[("_source_excludes", EXCLUDED_SOURCE_FIELDS.join(","))])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_not_found(id, &self.config.index, &body));
        }

        let entry: DocEntry = parse_json(response).await?;
        entry
            .into_document()
            .ok_or_else(|| BackendError::DocumentNotFound(id.to_string()))
    }

    async fn get_batch(&self, ids: &[DocumentId]) -> Vec<BackendResult<Document>> {
        if ids.is_empty() {
            return Vec::new();
        }

        let response = match self
            .client
            .post(self.index_url("/_mget"))
            .query(&[("_source_excludes", EXCLUDED_SOURCE_FIELDS.join(","))])
            .json(&mget_body(ids))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return fail_all(ids.len(), &BackendError::from(e)),
        };

        let parsed: MgetResponse = match parse_json(response).await {
            Ok(parsed) => parsed,
            Err(e) => return fail_all(ids.len(), &e),
        };

        match_mget(ids, parsed.docs)
    }
}

/// Align `_mget` entries with the requested ids
fn match_mget(ids: &[DocumentId], docs: Vec<DocEntry>) -> Vec<BackendResult<Document>> {
    let mut by_id: std::collections::HashMap<String, DocEntry> =
        docs.into_iter().map(|d| (d.id.clone(), d)).collect();
    ids.iter()
        .map(|id| {
            by_id
                .remove(id)
                .and_then(DocEntry::into_document)
                .ok_or_else(|| BackendError::DocumentNotFound(id.clone()))
        })
        .collect()
}

fn fail_all(n: usize, err: &BackendError) -> Vec<BackendResult<Document>> {
    (0..n)
        .map(|_| Err(BackendError::Unavailable(err.to_string())))
        .collect()
}

/// A 404 from `GET _doc/{id}` is either a `found: false` document entry or
/// an `index_not_found_exception` error body
fn classify_not_found(id: &str, index: &str, body: &str) -> BackendError {
    match serde_json::from_str::<DocEntry>(body) {
        Ok(entry) if !entry.found => BackendError::DocumentNotFound(id.to_string()),
        _ => BackendError::Unavailable(format!(
            "index '{}' not found: {}",
            index,
            error_reason(body)
        )),
    }
}

/// Map an error status to the backend taxonomy
async fn status_error(response: Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let reason = error_reason(&body);
    if status == StatusCode::BAD_REQUEST {
        BackendError::InvalidQuery(reason)
    } else {
        BackendError::Unavailable(format!("HTTP {}: {}", status, reason))
    }
}

async fn check_status(response: Response) -> BackendResult<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(status_error(response).await)
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
    if !response.status().is_success() {
        return Err(status_error(response).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|e| BackendError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_field_boosts;

    fn backend() -> ElasticBackend {
        ElasticBackend::new(SearchConfig::default(), default_field_boosts()).unwrap()
    }

    #[test]
    fn test_index_url() {
        let mut config = SearchConfig::default();
        config.url = "http://es:9200/".to_string();
        let es = ElasticBackend::new(config, default_field_boosts()).unwrap();
        assert_eq!(es.index_url("/_search"), "http://es:9200/insights-questions/_search");
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_checked_before_io() {
        let err = backend().search_vector(&[0.1, 0.2], 10).await.unwrap_err();
        assert!(matches!(
            err,
            BackendError::DimensionMismatch {
                expected: 384,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_blank_lexical_query_rejected() {
        let err = backend().search_lexical("  ", 10).await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidQuery(_)));
    }

    #[test]
    fn test_doc_url_encodes_id() {
        let es = backend();
        assert_eq!(
            es.doc_url("abc-1_2.x").unwrap().as_str(),
            "http://localhost:9200/insights-questions/_doc/abc-1_2.x"
        );
        assert_eq!(
            es.doc_url("a/b c?#%").unwrap().path(),
            "/insights-questions/_doc/a%2Fb%20c%3F%23%25"
        );
        assert!(matches!(es.doc_url(".."), Err(BackendError::InvalidQuery(_))));
        assert!(matches!(es.doc_url(""), Err(BackendError::InvalidQuery(_))));
    }

    #[test]
    fn test_not_found_body_classification() {
        let missing_doc = r#"{"_index": "faq", "_id": "7", "found": false}"#;
        assert!(matches!(
            classify_not_found("7", "faq", missing_doc),
            BackendError::DocumentNotFound(ref id) if id == "7"
        ));

        // The word "found" inside an error reason is still a missing index
        let missing_index = r#"{"error": {"type": "index_not_found_exception",
            "reason": "no such index [faq], \"found\" nothing"}, "status": 404}"#;
        let err = classify_not_found("7", "faq", missing_index);
        assert!(matches!(err, BackendError::Unavailable(ref msg) if msg.contains("no such index")));

        assert!(matches!(
            classify_not_found("7", "faq", "not json"),
            BackendError::Unavailable(_)
        ));
    }

    #[test]
    fn test_match_mget_keeps_request_order() {
        let docs: Vec<DocEntry> = serde_json::from_str(
            r#"[
                {"_id": "b", "found": true, "_source": {"Question": "B?"}},
                {"_id": "a", "found": true, "_source": {"Question": "A?"}},
                {"_id": "c", "found": false}
            ]"#,
        )
        .unwrap();
        let ids = vec!["a".to_string(), "c".to_string(), "b".to_string()];
        let results = match_mget(&ids, docs);
        assert_eq!(results[0].as_ref().unwrap().question, "A?");
        assert!(matches!(results[1], Err(BackendError::DocumentNotFound(ref id)) if id == "c"));
        assert_eq!(results[2].as_ref().unwrap().question, "B?");
    }
}
