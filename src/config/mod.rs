//! Configuration for faqrank

mod embedding;
mod logging;
mod retrieval;
mod search;

pub use embedding::EmbeddingConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use retrieval::{default_field_boosts, FieldBoost, PartialFailurePolicy, RetrievalConfig};
pub use search::{SearchConfig, VECTOR_FIELDS};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "faqrank.toml";

/// Environment variable overriding `search.url`
pub const ELASTIC_URL_ENV: &str = "ELASTIC_URL";

/// Upper bound accepted for vector dimensionality
const MAX_DIMENSIONS: usize = 4096;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Embedding provider
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Search backend connection and index layout
    #[serde(default)]
    pub search: SearchConfig,
    /// Fusion and orchestration settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let mut config = Self::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse without validation
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ELASTIC_URL_ENV) {
            if !url.trim().is_empty() {
                self.search.url = url;
            }
        }
    }

    /// Validate all configuration fields.
    ///
    /// Collects every validation error and reports them together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Embedding / index dimensions
        let embedding_dims = self.embedding.dimensions();
        if embedding_dims == 0 {
            errors.push("embedding dimensions must be positive".to_string());
        }
        if embedding_dims > MAX_DIMENSIONS {
            errors.push(format!("embedding dimensions must be <= {}", MAX_DIMENSIONS));
        }
        if self.search.dimensions == 0 {
            errors.push("search dimensions must be positive".to_string());
        }
        if embedding_dims != self.search.dimensions {
            errors.push(format!(
                "embedding dimensions ({}) must match search dimensions ({})",
                embedding_dims, self.search.dimensions
            ));
        }
        if let EmbeddingConfig::Http {
            endpoint,
            max_batch_size,
            ..
        } = &self.embedding
        {
            if url::Url::parse(endpoint).is_err() {
                errors.push(format!("embedding endpoint '{}' is not a valid URL", endpoint));
            }
            if *max_batch_size == 0 {
                errors.push("max_batch_size must be positive".to_string());
            }
        }

        // Search backend
        if url::Url::parse(&self.search.url).is_err() {
            errors.push(format!("search url '{}' is not a valid URL", self.search.url));
        }
        if self.search.index.trim().is_empty() {
            errors.push("search index must not be empty".to_string());
        }
        if !VECTOR_FIELDS.contains(&self.search.vector_field.as_str()) {
            errors.push(format!(
                "vector_field must be one of {:?}, got '{}'",
                VECTOR_FIELDS, self.search.vector_field
            ));
        }
        if self.search.timeout_secs == 0 {
            errors.push("search timeout_secs must be positive".to_string());
        }

        // Retrieval
        if self.retrieval.rrf_k == 0 {
            errors.push("rrf_k must be positive".to_string());
        }
        if self.retrieval.top_k == 0 {
            errors.push("top_k must be positive".to_string());
        }
        if self.retrieval.fetch_depth == 0 {
            errors.push("fetch_depth must be positive".to_string());
        }
        if self.search.num_candidates < self.retrieval.fetch_depth {
            errors.push(format!(
                "num_candidates ({}) must be >= fetch_depth ({})",
                self.search.num_candidates, self.retrieval.fetch_depth
            ));
        }
        if self.retrieval.timeout_ms == 0 {
            errors.push("retrieval timeout_ms must be positive".to_string());
        }
        validate_boosts(&self.retrieval.field_boosts, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

fn validate_boosts(boosts: &[FieldBoost], errors: &mut Vec<String>) {
    if boosts.len() < 3 {
        errors.push(format!(
            "field_boosts must name at least 3 fields, got {}",
            boosts.len()
        ));
    }
    if boosts.iter().any(|b| b.field.trim().is_empty()) {
        errors.push("field_boosts entries must name a field".to_string());
    }
    if boosts.iter().any(|b| !(b.boost > 0.0)) {
        errors.push("field_boosts values must be positive".to_string());
    }
    if let Some((primary, rest)) = boosts.split_first() {
        if rest.iter().any(|b| b.boost >= primary.boost) {
            errors.push(format!(
                "primary field '{}' must have the highest boost",
                primary.field
            ));
        }
    }
}
