//! Embeddings from an OpenAI-compatible `/v1/embeddings` endpoint
//!
//! Works against OpenAI itself and against self-hosted sentence-transformers
//! servers (text-embeddings-inference, vLLM, Ollama) that speak the same
//! request shape.

use super::traits::{normalize_embedding, require_text, EmbeddingBackend, EmbeddingError, EmbeddingResult};
use crate::config::EmbeddingConfig;
use crate::types::Embedding;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Settings for [`HttpBackend`]
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub endpoint: String,
    /// Falls back to `OPENAI_API_KEY` when unset
    pub api_key: Option<String>,
    pub model: String,
    pub dimensions: usize,
    pub timeout_secs: u64,
    /// Texts per request; larger inputs are split
    pub max_batch_size: usize,
}

impl TryFrom<&EmbeddingConfig> for HttpConfig {
    type Error = EmbeddingError;

    fn try_from(config: &EmbeddingConfig) -> EmbeddingResult<Self> {
        match config {
            EmbeddingConfig::Http {
                endpoint,
                api_key,
                model,
                dimensions,
                timeout_secs,
                max_batch_size,
            } => Ok(Self {
                endpoint: endpoint.clone(),
                api_key: api_key.clone(),
                model: model.clone(),
                dimensions: *dimensions,
                timeout_secs: *timeout_secs,
                max_batch_size: (*max_batch_size).max(1),
            }),
            other => Err(EmbeddingError::Config(format!(
                "expected an http embedding config, got '{}'",
                other.backend_name()
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    encoding_format: &'static str,
    /// Only text-embedding-3 models can shorten their output
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedItem>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbedItem {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct TokenUsage {
    total_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Async client for an OpenAI-compatible embedding API
#[derive(Debug)]
pub struct HttpBackend {
    client: Client,
    config: HttpConfig,
}

impl HttpBackend {
    pub fn new(config: HttpConfig) -> EmbeddingResult<Self> {
        let client = build_client(&config)?;
        info!(endpoint = %config.endpoint, model = %config.model, "HTTP embedder configured");
        Ok(Self { client, config })
    }

    fn dimensions_override(&self) -> Option<usize> {
        self.config
            .model
            .contains("text-embedding-3")
            .then_some(self.config.dimensions)
    }

    /// One round trip; `texts` must fit in a single request
    async fn post_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Embedding>> {
        let body = EmbedRequest {
            model: &self.config.model,
            input: texts,
            encoding_format: "float",
            dimensions: self.dimensions_override(),
        };
        debug!(count = texts.len(), "Requesting embeddings");

        let response = self.client.post(&self.config.endpoint).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_ms(response.headers());
            let text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, retry_after, &text));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::EmbeddingFailed(format!("unreadable response: {}", e)))?;
        if let Some(usage) = &parsed.usage {
            debug!(tokens = usage.total_tokens, "Embedding usage");
        }
        collect_vectors(texts.len(), parsed.data)
    }
}

#[async_trait]
impl EmbeddingBackend for HttpBackend {
    async fn embed(&self, text: &str) -> EmbeddingResult<Embedding> {
        let text = require_text(text)?;
        self.post_batch(&[text])
            .await?
            .pop()
            .ok_or_else(|| EmbeddingError::EmbeddingFailed("empty response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>> {
        let inputs = texts
            .iter()
            .map(|t| require_text(t))
            .collect::<EmbeddingResult<Vec<&str>>>()?;

        let mut vectors = Vec::with_capacity(inputs.len());
        for batch in inputs.chunks(self.config.max_batch_size.max(1)) {
            vectors.extend(self.post_batch(batch).await?);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn build_client(config: &HttpConfig) -> EmbeddingResult<Client> {
    let mut headers = HeaderMap::new();
    match config.api_key.clone().or_else(|| std::env::var(API_KEY_ENV).ok()) {
        Some(key) => {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| EmbeddingError::Config(format!("invalid API key: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        None if config.endpoint.contains("openai.com") => {
            warn!("No API key for {}; set {}", config.endpoint, API_KEY_ENV);
        }
        None => {}
    }

    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(headers)
        .build()
        .map_err(|e| EmbeddingError::Config(format!("HTTP client: {}", e)))
}

fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}

fn classify_failure(status: StatusCode, retry_after_ms: Option<u64>, body: &str) -> EmbeddingError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return EmbeddingError::RateLimited { retry_after_ms };
    }
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    EmbeddingError::EmbeddingFailed(format!("{}: {}", status, detail))
}

/// Put items back in request order and normalize them.
///
/// Every index in `0..expected` must appear exactly once.
fn collect_vectors(expected: usize, items: Vec<EmbedItem>) -> EmbeddingResult<Vec<Embedding>> {
    if items.len() != expected {
        return Err(EmbeddingError::EmbeddingFailed(format!(
            "expected {} embeddings, got {}",
            expected,
            items.len()
        )));
    }
    let mut slots: Vec<Option<Embedding>> = vec![None; expected];
    for item in items {
        let slot = slots
            .get_mut(item.index)
            .filter(|slot| slot.is_none())
            .ok_or_else(|| {
                EmbeddingError::EmbeddingFailed(format!(
                    "bad or repeated index {} in response",
                    item.index
                ))
            })?;
        *slot = Some(normalize_embedding(&item.embedding));
    }
    Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(index: usize, embedding: Vec<f32>) -> EmbedItem {
        EmbedItem { index, embedding }
    }

    fn local_config() -> HttpConfig {
        HttpConfig::try_from(&EmbeddingConfig::default()).unwrap()
    }

    #[test]
    fn test_config_from_embedding_config() {
        let config = local_config();
        assert_eq!(config.endpoint, "http://localhost:8080/v1/embeddings");
        assert_eq!(config.model, "multi-qa-MiniLM-L6-cos-v1");
        assert_eq!(config.dimensions, 384);
        assert_eq!(config.max_batch_size, 100);

        let hash = EmbeddingConfig::Hash { dimensions: 8 };
        assert!(matches!(HttpConfig::try_from(&hash), Err(EmbeddingError::Config(_))));
    }

    #[test]
    fn test_collect_vectors_reorders() {
        let body = r#"{
            "data": [
                {"embedding": [0.0, 2.0], "index": 1},
                {"embedding": [5.0, 0.0], "index": 0}
            ],
            "usage": {"prompt_tokens": 4, "total_tokens": 4}
        }"#;
        let parsed: EmbedResponse = serde_json::from_str(body).unwrap();
        let vectors = collect_vectors(2, parsed.data).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_collect_vectors_rejects_bad_indices() {
        let repeated = vec![item(0, vec![1.0]), item(0, vec![1.0])];
        assert!(collect_vectors(2, repeated).is_err());

        let out_of_range = vec![item(3, vec![1.0])];
        assert!(collect_vectors(1, out_of_range).is_err());

        assert!(collect_vectors(2, vec![item(0, vec![1.0])]).is_err());
    }

    #[test]
    fn test_classify_failure() {
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, Some(2000), "");
        assert!(matches!(err, EmbeddingError::RateLimited { retry_after_ms: Some(2000) }));

        let body = r#"{"error": {"message": "model not loaded"}}"#;
        let err = classify_failure(StatusCode::SERVICE_UNAVAILABLE, None, body);
        assert!(err.to_string().contains("model not loaded"));

        let err = classify_failure(StatusCode::BAD_GATEWAY, None, "upstream down\n");
        assert!(err.to_string().ends_with("upstream down"));
    }

    #[test]
    fn test_retry_after_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after_ms(&headers), None);
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        assert_eq!(retry_after_ms(&headers), Some(3000));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("18446744073709552"));
        assert_eq!(retry_after_ms(&headers), Some(u64::MAX));
    }

    #[test]
    fn test_dimensions_only_sent_to_text_embedding_3() {
        let backend = HttpBackend::new(local_config()).unwrap();
        assert_eq!(backend.dimensions_override(), None);

        let backend = HttpBackend::new(HttpConfig {
            model: "text-embedding-3-small".to_string(),
            api_key: Some("sk-test".to_string()),
            ..local_config()
        })
        .unwrap();
        assert_eq!(backend.dimensions_override(), Some(384));

        let request = EmbedRequest {
            model: "multi-qa-MiniLM-L6-cos-v1",
            input: &["hello"],
            encoding_format: "float",
            dimensions: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("dimensions").is_none());
        assert_eq!(value["input"][0], "hello");
    }

    #[tokio::test]
    async fn test_blank_text_rejected_before_request() {
        let backend = HttpBackend::new(local_config()).unwrap();
        let err = backend.embed("   ").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidInput(_)));

        let texts = vec!["ok".to_string(), "".to_string()];
        let err = backend.embed_batch(&texts).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidInput(_)));
    }
}
