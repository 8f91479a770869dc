pub mod chunk;
pub mod index;
pub mod query;
pub mod stats;
pub mod ui;

pub use chunk::handle_chunk;
pub use index::handle_index;
pub use query::{handle_query, QueryArgs};
pub use stats::handle_stats;

use alchemist_config::Config;
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "alchemist")]
#[command(about = "Chunk, embed and index a document, then answer questions about it with citations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a document into token-bounded chunks without calling any service
    Chunk {
        /// Text file to chunk
        file: PathBuf,

        /// Print one JSON object per chunk
        #[arg(long)]
        json: bool,

        /// Document id recorded on each chunk (defaults to the file name)
        #[arg(long)]
        doc_id: Option<String>,
    },
    /// Chunk, embed and upload a document to the vector index
    Index {
        /// Text file to index
        file: PathBuf,

        /// Document id used for vector ids and the `source` field
        #[arg(long)]
        doc_id: Option<String>,
    },
    /// Answer a question, or start an interactive session without one
    Query(QueryArgs),
    /// Show vector index statistics
    Stats,
}

pub fn load_config(path: Option<&Path>) -> alchemist_config::Result<Config> {
    match path {
        Some(p) => Config::from_file(p),
        None => Config::load(),
    }
}

/// Explicit id, else the file name
pub fn document_id(file: &Path, explicit: Option<String>) -> Option<String> {
    explicit.or_else(|| {
        file.file_name()
            .map(|name| name.to_string_lossy().into_owned())
    })
}
