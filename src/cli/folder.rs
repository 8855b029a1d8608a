use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::catalog::store::{BookStore, CatalogError};
use crate::cli::{print_summary, OutputFormat, SearchArgs};
use crate::matching::engine::AlignmentEngine;
use crate::pipeline::{discover_folder, is_complete, run_batch, References, RunSummary};

#[derive(Args)]
pub struct FolderArgs {
    /// Root folder laid out as `<speaker>/<book>/transcripts.txt`
    pub root: PathBuf,

    /// Folder holding one `<book>.txt` per book
    #[arg(short, long)]
    pub books: PathBuf,

    /// Leave complete outputs untouched instead of re-scoring them
    #[arg(long)]
    pub skip_complete: bool,

    #[command(flatten)]
    pub search: SearchArgs,
}

/// Execute folder subcommand
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the root cannot be
/// listed, or a batch fails to read or write its files. A book without a
/// reference text only skips its own folder.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: FolderArgs, format: OutputFormat) -> anyhow::Result<()> {
    let started = Instant::now();
    let config = args.search.to_config()?;
    let mut engine = AlignmentEngine::new(config)?;
    let store = BookStore::new(&args.books);

    let jobs = discover_folder(&args.root)
        .with_context(|| format!("Failed to list {}", args.root.display()))?;
    info!(root = %args.root.display(), books = jobs.len(), "Found book folders");

    let mut total = RunSummary::default();
    for job in &jobs {
        if args.skip_complete && is_complete(&job.transcripts, &job.output)? {
            info!(speaker = %job.speaker, book_id = %job.book_id, "Output complete, skipping");
            total.skipped_complete += 1;
            continue;
        }

        let reference = match engine.reference_for(&store, &job.book_id) {
            Ok(reference) => reference,
            Err(CatalogError::MissingReference { path, .. }) => {
                warn!(
                    speaker = %job.speaker,
                    book_id = %job.book_id,
                    path = %path.display(),
                    "Reference text missing, skipping folder"
                );
                total.missing_book(&job.book_id);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let summary = run_batch(
            &mut engine,
            &References::Single(reference),
            &job.transcripts,
            &job.output,
        )
        .with_context(|| format!("Failed to align {}", job.transcripts.display()))?;
        total.absorb(&summary);
    }

    total.elapsed_secs = started.elapsed().as_secs_f64();
    print_summary(&total, format)
}
