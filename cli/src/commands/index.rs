use super::document_id;
use super::ui::{format_duration, print_header, print_key_value, print_success, progress_bar, spinner};
use alchemist_config::Config;
use alchemist_pipeline::IndexPipeline;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

pub async fn handle_index(config: &Config, file: &Path, doc_id: Option<String>) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let doc_id = document_id(file, doc_id);
    info!(
        file = %file.display(),
        bytes = text.len(),
        index = %config.index.name,
        "indexing document"
    );

    let pipeline = IndexPipeline::from_config(config)?;

    let chunking = spinner("Chunking document...");
    let bar: OnceLock<ProgressBar> = OnceLock::new();
    let report = pipeline
        .run_with_progress(
            &text,
            doc_id.as_deref(),
            |chunks| {
                chunking.finish_and_clear();
                let _ = bar.set(progress_bar(chunks as u64, "Embedding"));
            },
            |embedded| {
                if let Some(bar) = bar.get() {
                    bar.inc(embedded as u64);
                }
            },
        )
        .await;
    chunking.finish_and_clear();
    if let Some(bar) = bar.get() {
        bar.finish_and_clear();
    }
    let report = report?;

    print_header(&format!("Indexed {}", file.display()));
    print_key_value("Index", &config.index.name);
    if let Some(id) = &report.document_id {
        print_key_value("Document id", id);
    }
    print_key_value("Chunks", &report.stats.chunks.to_string());
    print_key_value("Total tokens", &report.stats.total_tokens.to_string());
    if report.stats.chunks > 0 {
        print_key_value(
            "Tokens per chunk",
            &format!(
                "min {} / max {} / avg {:.1}",
                report.stats.min_tokens, report.stats.max_tokens, report.stats.avg_tokens
            ),
        );
    }
    for (condition, count) in &report.stats.boundary {
        print_key_value(&format!("{condition:?}"), &count.to_string());
    }
    print_key_value("Vectors upserted", &report.vectors_upserted.to_string());
    print_key_value(
        "Timings",
        &format!(
            "chunking {} / embedding {} / upsert {} / total {}",
            format_duration(report.timings.chunking),
            format_duration(report.timings.embedding),
            format_duration(report.timings.upsert),
            format_duration(report.timings.total)
        ),
    );

    print_success(&format!(
        "{} vectors written to '{}'",
        report.vectors_upserted, config.index.name
    ));
    Ok(())
}
