use super::OutputFormat;
use anyhow::{bail, Context, Result};
use faqrank::{
    config::Config,
    prompt::build_prompt,
    retrieval::{RetrievalReport, Retriever},
    types::{Query, RetrievalMode},
    util::{single_line, truncate_str},
};
use tracing::debug;

pub async fn search_faqs(
    mut config: Config,
    query_text: String,
    mode: Option<RetrievalMode>,
    top_k: Option<usize>,
    format: OutputFormat,
    show_prompt: bool,
) -> Result<()> {
    if let Some(top_k) = top_k {
        if top_k == 0 {
            bail!("--top-k must be greater than 0");
        }
        config.retrieval.top_k = top_k;
    }
    let mode = mode.unwrap_or(config.retrieval.mode);

    let retriever = Retriever::from_config(&config)?;

    // Ctrl-C cancels the in-flight retrieval
    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            debug!("Ctrl-C handler unavailable, search is not cancellable");
            std::future::pending::<()>().await;
        }
    };

    let report = retriever
        .retrieve_until(&Query::new(query_text.as_str()), mode, cancel)
        .await
        .context("Search failed")?;

    if show_prompt {
        let prompt = build_prompt(&query_text, &report.documents);
        match format {
            OutputFormat::Json => {
                let body = serde_json::json!({ "query": query_text, "prompt": prompt });
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            OutputFormat::Text => println!("{}", prompt),
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&query_text, &report),
    }
    Ok(())
}

fn print_report(query: &str, report: &RetrievalReport) {
    println!(
        "\nResults for '{}' ({}, {} documents, {}ms):\n",
        truncate_str(query, 80),
        report.mode,
        report.documents.len(),
        report.elapsed_ms
    );
    if let Some(list) = report.degraded_to {
        println!("   (answered from the {} list only)\n", list);
    }
    if report.documents.is_empty() {
        println!("   No matching FAQ entries.");
        return;
    }

    for (i, (doc, fused)) in report.scored().enumerate() {
        let score = fused.map(|f| f.rrf_score).unwrap_or_default();
        println!("[{}] [Score: {:.4}] {}", i + 1, score, doc.category);
        println!("   Q: {}", single_line(&doc.question));
        println!("   A: {}", truncate_str(&single_line(&doc.answer), 200));

        if let Some(fused) = fused {
            let ranks: Vec<String> = [("vector", fused.vector_rank), ("lexical", fused.lexical_rank)]
                .iter()
                .filter_map(|(name, rank)| rank.map(|r| format!("{}#{}", name, r)))
                .collect();
            println!("   Matched by: {}", ranks.join(", "));
        }
        println!("   Id: {}", doc.id);
        println!();
    }
}
