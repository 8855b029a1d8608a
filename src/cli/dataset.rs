use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::catalog::store::BookStore;
use crate::cli::align::default_output;
use crate::cli::{print_summary, OutputFormat, SearchArgs};
use crate::matching::engine::AlignmentEngine;
use crate::pipeline::{run_batch, References};

#[derive(Args)]
pub struct DatasetArgs {
    /// Transcripts file whose filenames are `speaker_book_segment`
    pub transcripts: PathBuf,

    /// Folder holding one `<book>.txt` per book
    #[arg(short, long)]
    pub books: PathBuf,

    /// Output file (default: output.txt beside the transcripts)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub search: SearchArgs,
}

/// Execute dataset subcommand
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the batch fails.
/// Books without a reference text are reported in the summary instead.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DatasetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = args.search.to_config()?;
    let mut engine = AlignmentEngine::new(config)?;

    if !args.books.is_dir() {
        anyhow::bail!("Books folder {} does not exist", args.books.display());
    }
    let store = BookStore::new(&args.books);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.transcripts));
    let summary = run_batch(&mut engine, &References::Library(&store), &args.transcripts, &output)
        .with_context(|| format!("Failed to align {}", args.transcripts.display()))?;

    print_summary(&summary, format)
}
