use anyhow::{bail, Context, Result};
use faqrank::config::{Config, EmbeddingConfig, DEFAULT_CONFIG_FILE};
use std::fmt::Write as _;
use std::path::Path;

pub fn init_config(path: &Path, force: bool) -> Result<()> {
    let config_path = path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory '{}'", path.display()))?;
    std::fs::write(&config_path, render_default_config())
        .with_context(|| format!("Failed to write '{}'", config_path.display()))?;
    println!("Created configuration file: {}", config_path.display());

    Ok(())
}

/// Commented TOML rendering of the default configuration
fn render_default_config() -> String {
    let config = Config::default();
    let (endpoint, model, timeout_secs, max_batch_size) = match &config.embedding {
        EmbeddingConfig::Http {
            endpoint,
            model,
            timeout_secs,
            max_batch_size,
            ..
        } => (endpoint.clone(), model.clone(), *timeout_secs, *max_batch_size),
        EmbeddingConfig::Hash { .. } => Default::default(),
    };

    let mut boosts = String::new();
    for boost in &config.retrieval.field_boosts {
        let _ = write!(
            boosts,
            "\n[[retrieval.field_boosts]]\nfield = \"{}\"\nboost = {:.1}\n",
            boost.field, boost.boost
        );
    }

    format!(
        r#"# faqrank configuration

[embedding]
# "http" (OpenAI-compatible endpoint) or "hash" (offline, for testing)
backend = "http"
endpoint = "{endpoint}"
model = "{model}"
dimensions = {embedding_dims}
timeout_secs = {timeout_secs}
max_batch_size = {max_batch_size}
# api_key = "..."   # or set OPENAI_API_KEY

[search]
# ELASTIC_URL overrides this
url = "{url}"
index = "{index}"
dimensions = {search_dims}
# question_vector | text_vector | question_text_vector
vector_field = "{vector_field}"
num_candidates = {num_candidates}
timeout_secs = {search_timeout}

[retrieval]
# "lexical" or "hybrid"
mode = "{mode}"
fetch_depth = {fetch_depth}
top_k = {top_k}
rrf_k = {rrf_k}
timeout_ms = {timeout_ms}
# Continue with lexical results when the embedder fails
fallback_to_lexical = {fallback}
# "degrade" fuses the surviving list when one search fails, "fail" aborts
partial_failure = "degrade"
{boosts}
[logging]
# "text" or "json"
format = "text"
level = "info"
"#,
        embedding_dims = config.embedding.dimensions(),
        url = config.search.url,
        index = config.search.index,
        search_dims = config.search.dimensions,
        vector_field = config.search.vector_field,
        num_candidates = config.search.num_candidates,
        search_timeout = config.search.timeout_secs,
        mode = config.retrieval.mode,
        fetch_depth = config.retrieval.fetch_depth,
        top_k = config.retrieval.top_k,
        rrf_k = config.retrieval.rrf_k,
        timeout_ms = config.retrieval.timeout_ms,
        fallback = config.retrieval.fallback_to_lexical,
    )
}
