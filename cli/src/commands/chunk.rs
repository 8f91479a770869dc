use super::document_id;
use super::ui::{format_duration, print_header, print_key_value};
use alchemist_config::Config;
use alchemist_pipeline::index::build_chunker;
use alchemist_pipeline::ChunkStats;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::info;

pub async fn handle_chunk(config: &Config, file: &Path, json: bool, doc_id: Option<String>) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let doc_id = document_id(file, doc_id);

    let started = Instant::now();
    let chunker = build_chunker(config)?;
    let chunks = chunker.chunk(&text, doc_id.as_deref())?;
    let elapsed = started.elapsed();
    info!(chunks = chunks.len(), "chunked {}", file.display());

    if json {
        for chunk in &chunks {
            println!("{}", serde_json::to_string(chunk)?);
        }
        return Ok(());
    }

    let stats = ChunkStats::from_chunks(&chunks);
    print_header(&format!("Chunked {}", file.display()));
    print_key_value("Tokenizer", config.chunking.tokenizer.as_str());
    print_key_value(
        "Window",
        &format!(
            "{}-{} tokens, overlap {}-{}",
            config.chunking.min_tokens,
            config.chunking.max_tokens,
            config.chunking.min_overlap,
            config.chunking.max_overlap
        ),
    );
    print_key_value("Chunks", &stats.chunks.to_string());
    print_key_value("Total tokens", &stats.total_tokens.to_string());
    if stats.chunks > 0 {
        print_key_value(
            "Tokens per chunk",
            &format!(
                "min {} / max {} / avg {:.1}",
                stats.min_tokens, stats.max_tokens, stats.avg_tokens
            ),
        );
    }
    for (condition, count) in &stats.boundary {
        print_key_value(&format!("{condition:?}"), &count.to_string());
    }
    print_key_value("Elapsed", &format_duration(elapsed));

    print_header("Chunks");
    for chunk in &chunks {
        let flags = if chunk.boundary.is_empty() {
            String::new()
        } else {
            format!(" {:?}", chunk.boundary)
        };
        let preview: String = chunk.text.chars().take(60).collect();
        println!(
            "#{:<4} {:>5} tokens ({:>4} overlap) bytes {}..{}{}  {}",
            chunk.index,
            chunk.token_count,
            chunk.overlap_token_count,
            chunk.start_byte,
            chunk.end_byte,
            flags,
            preview.replace('\n', " ").trim()
        );
    }
    Ok(())
}
