use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use tracing::info;

use crate::catalog::store::read_book;
use crate::cli::{print_summary, OutputFormat, SearchArgs};
use crate::matching::engine::AlignmentEngine;
use crate::pipeline::folder::OUTPUT_FILE;
use crate::pipeline::{run_batch, References};

#[derive(Args)]
pub struct AlignArgs {
    /// Transcripts file with one `filename<TAB>text` fragment per line
    pub transcripts: PathBuf,

    /// Reference book text
    pub book: PathBuf,

    /// Output file (default: output.txt beside the transcripts)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub search: SearchArgs,
}

/// Default output path: `output.txt` in the folder of `transcripts`
pub(crate) fn default_output(transcripts: &Path) -> PathBuf {
    transcripts
        .parent()
        .map_or_else(|| PathBuf::from(OUTPUT_FILE), |dir| dir.join(OUTPUT_FILE))
}

/// Execute align subcommand
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the book is missing,
/// or the batch fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: AlignArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = args.search.to_config()?;
    let mut engine = AlignmentEngine::new(config)?;

    // Read the book before anything is written
    let book_id = args
        .book
        .file_stem()
        .map_or_else(String::new, |s| s.to_string_lossy().into_owned());
    let raw = read_book(&book_id, &args.book)?;
    let reference = Arc::new(engine.prepare_reference(&raw));
    info!(book = %args.book.display(), tokens = reference.len(), "Loaded reference book");

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.transcripts));
    let summary = run_batch(
        &mut engine,
        &References::Single(reference),
        &args.transcripts,
        &output,
    )?;

    print_summary(&summary, format)
}
