use anyhow::{Context, Result};
use faqrank::{
    backend::ElasticBackend,
    config::Config,
    embedding::create_backend,
    ingest::{load_documents, Ingestor},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub async fn index_faqs(config: Config, file: &Path, recreate: bool, quiet: bool) -> Result<()> {
    let records = load_documents(file)?;
    info!("Loaded {} FAQ records from {}", records.len(), file.display());

    let elastic = ElasticBackend::new(config.search.clone(), config.retrieval.field_boosts.clone())
        .context("Failed to create search backend")?;
    let embedder = create_backend(&config.embedding).context("Failed to create embedding backend")?;
    let ingestor = Ingestor::new(Arc::new(elastic), embedder);

    let progress = (!quiet).then(|| progress_bar(records.len() as u64));
    let stats = ingestor
        .run(&records, recreate, |done, _total| {
            if let Some(pb) = &progress {
                pb.set_position(done as u64);
            }
        })
        .await?;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    println!(
        "Indexed {} records into '{}' in {:.1}s{}",
        stats.indexed,
        config.search.index,
        stats.elapsed.as_secs_f64(),
        if stats.recreated { " (index created)" } else { "" }
    );
    Ok(())
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message("embedding + indexing");
    pb
}
