use super::ui::{format_duration, print_error, print_header, print_key_value, print_source, spinner};
use alchemist_config::Config;
use alchemist_core::QueryError;
use alchemist_pipeline::{QueryOptions, QueryOutcome, QueryPipeline};
use anyhow::Result;
use clap::Args;
use console::Style;
use std::io::{self, BufRead, Write};
use std::time::Duration;

#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Question to answer; omit to start an interactive session
    pub query: Option<String>,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Minimum similarity score for a chunk to be used as context
    #[arg(short = 's', long)]
    pub min_score: Option<f32>,

    /// Sampling temperature (ignored by reasoning models)
    #[arg(short = 't', long)]
    pub temperature: Option<f32>,

    /// Completion token limit
    #[arg(short = 'm', long)]
    pub max_tokens: Option<u32>,
}

impl QueryArgs {
    fn options(&self) -> QueryOptions {
        QueryOptions {
            top_k: self.top_k,
            min_score: self.min_score,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

pub async fn handle_query(config: &Config, args: QueryArgs) -> Result<()> {
    let pipeline = QueryPipeline::from_config(config)?;
    let options = args.options();

    match args.query.as_deref() {
        Some(query) => {
            let outcome = ask(&pipeline, query, &options).await?;
            print_outcome(&outcome);
            Ok(())
        }
        None => interactive(&pipeline, &options).await,
    }
}

async fn ask(pipeline: &QueryPipeline, query: &str, options: &QueryOptions) -> Result<QueryOutcome> {
    let spinner = spinner("Thinking...");
    let outcome = pipeline.run(query, options).await;
    spinner.finish_and_clear();
    outcome
}

#[derive(Default)]
struct SessionStats {
    queries: usize,
    failures: usize,
    tokens: u64,
    elapsed: Duration,
}

async fn interactive(pipeline: &QueryPipeline, options: &QueryOptions) -> Result<()> {
    print_header(&format!("Interactive session ({})", pipeline.model()));
    println!(
        "{}",
        Style::new()
            .dim()
            .apply_to("Ask a question, or type 'quit' to leave.")
    );

    let mut session = SessionStats::default();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("\n{} ", Style::new().bold().green().apply_to(">"));
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        match ask(pipeline, input, options).await {
            Ok(outcome) => {
                session.queries += 1;
                session.tokens += u64::from(outcome.answer.usage.total_tokens);
                session.elapsed += outcome.timings.total;
                print_outcome(&outcome);
            }
            Err(err) => {
                if let Some(query_err) = err.downcast_ref::<QueryError>() {
                    print_error(&query_err.to_string());
                } else {
                    session.failures += 1;
                    print_error(&format!("{err:#}"));
                }
            }
        }
    }

    print_header("Session summary");
    print_key_value("Queries answered", &session.queries.to_string());
    print_key_value("Failed queries", &session.failures.to_string());
    print_key_value("Tokens used", &session.tokens.to_string());
    if session.queries > 0 {
        let avg = session.elapsed / session.queries as u32;
        print_key_value("Average latency", &format_duration(avg));
    }
    Ok(())
}

fn print_outcome(outcome: &QueryOutcome) {
    print_header("Answer");
    println!("{}", outcome.answer.answer.trim());

    if !outcome.chunks.is_empty() {
        print_header("Sources");
        for (i, chunk) in outcome.chunks.iter().enumerate() {
            print_source(i + 1, &chunk.id, chunk.score, &chunk.text);
        }
    }

    let t = &outcome.timings;
    println!(
        "{}",
        Style::new().dim().apply_to(format!(
            "{} | {} tokens | embed {} / retrieve {} / generate {} / total {}",
            outcome.answer.model,
            outcome.answer.usage.total_tokens,
            format_duration(t.embedding),
            format_duration(t.retrieval),
            format_duration(t.generation),
            format_duration(t.total)
        ))
    );
}
