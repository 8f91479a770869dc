mod commands;

use alchemist_config::ErrorFormatter;
use anyhow::Result;
use clap::Parser;
use commands::{handle_chunk, handle_index, handle_query, handle_stats, load_config, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", ErrorFormatter::new(err));
            std::process::exit(2);
        }
    };

    match cli.command {
        Commands::Chunk { file, json, doc_id } => {
            handle_chunk(&config, &file, json, doc_id).await?;
        }
        Commands::Index { file, doc_id } => {
            handle_index(&config, &file, doc_id).await?;
        }
        Commands::Query(args) => {
            handle_query(&config, args).await?;
        }
        Commands::Stats => {
            handle_stats(&config).await?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `-v` raises the level from warn
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
