//! Command-line interface for phrase-aligner.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **align**: Align one transcripts file against one book
//! - **folder**: Align every `<speaker>/<book>/transcripts.txt` under a root folder
//! - **dataset**: Align a transcripts file whose fragments name their own books
//! - **segments**: Summarize or merge an audio segment list
//!
//! ## Usage
//!
//! ```text
//! # One book
//! phrase-aligner align transcripts.txt book.txt -o output.txt
//!
//! # Every book folder, carrying the cursor forward between fragments
//! phrase-aligner folder data/ --books lv_text/ --sequenced --threads 8
//!
//! # JSON summary for scripting
//! phrase-aligner dataset transcripts.txt --books lv_text/ --format json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::core::types::{MetricKind, SearchType};
use crate::matching::engine::AlignerConfig;
use crate::pipeline::RunSummary;

pub mod align;
pub mod dataset;
pub mod folder;
pub mod segments;

#[derive(Parser)]
#[command(name = "phrase-aligner")]
#[command(version)]
#[command(about = "Recover punctuated phrases for ASR transcript fragments from their source books")]
#[command(
    long_about = "phrase-aligner locates each punctuation-free transcript fragment in the book it was read from.\n\nFor every fragment it reports:\n- The matching phrase with the book's punctuation and capitalization\n- A similarity score between 0 and 1\n\nRe-running over a complete output only re-aligns low-similarity records."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format of the run summary
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align a transcripts file against a single book
    Align(align::AlignArgs),

    /// Align every book folder under a root directory
    Folder(folder::FolderArgs),

    /// Align a transcripts file spanning many books
    Dataset(dataset::DatasetArgs),

    /// Inspect and merge an audio segment list
    Segments(segments::SegmentsArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Search options shared by the alignment commands.
///
/// Flags override values from `--config`.
#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Token similarity metric (hamming or levenshtein)
    #[arg(short, long)]
    pub metric: Option<MetricKind>,

    /// Authoritative matcher
    #[arg(long, value_enum)]
    pub search_type: Option<SearchType>,

    /// Start each search where the previous fragment of the same book ended
    #[arg(long)]
    pub sequenced: bool,

    /// Number of search workers
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Similarity at which a search stops scanning
    #[arg(long)]
    pub early_exit: Option<f64>,

    /// Results at or below this similarity are reported as not found
    #[arg(long)]
    pub min_similarity: Option<f64>,

    /// Re-score mode keeps earlier results above this similarity
    #[arg(long)]
    pub rescore_threshold: Option<f64>,

    /// Compare letters including their accents
    #[arg(long)]
    pub no_fold_diacritics: bool,

    /// Replace URLs in the books with <URL>
    #[arg(long)]
    pub replace_urls: bool,

    /// Replace e-mail addresses in the books with <EMAIL>
    #[arg(long)]
    pub replace_emails: bool,

    /// Replace numbers in the books with <NUMBER>
    #[arg(long)]
    pub replace_numbers: bool,
}

impl SearchArgs {
    /// Build the engine configuration from `--config` and the flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or a value is out of range.
    pub fn to_config(&self) -> anyhow::Result<AlignerConfig> {
        let mut config = match &self.config {
            Some(path) => AlignerConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => AlignerConfig::default(),
        };

        if let Some(metric) = self.metric {
            config.metric = metric;
        }
        if let Some(search_type) = self.search_type {
            config.search_type = search_type;
        }
        if self.sequenced {
            config.sequenced = true;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(threshold) = self.early_exit {
            config.early_exit_threshold = threshold;
        }
        if let Some(threshold) = self.min_similarity {
            config.min_similarity = threshold;
        }
        if let Some(threshold) = self.rescore_threshold {
            config.rescore_threshold = threshold;
        }
        if self.no_fold_diacritics {
            config.fold_diacritics = false;
        }
        config.cleaning.replace_urls |= self.replace_urls;
        config.cleaning.replace_emails |= self.replace_emails;
        config.cleaning.replace_numbers |= self.replace_numbers;

        config.validate()?;
        Ok(config)
    }
}

/// Print a run summary to stdout.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print_summary(summary: &RunSummary, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print_text_summary(summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
        OutputFormat::Tsv => print_tsv_summary(summary),
    }
    Ok(())
}

fn print_text_summary(summary: &RunSummary) {
    println!("Records:          {}", summary.records);
    println!("Matched:          {}", summary.matched);
    println!("Not found:        {}", summary.not_found);
    if summary.kept > 0 {
        println!("Kept (re-score):  {}", summary.kept);
    }
    if summary.malformed > 0 {
        println!("Malformed:        {}", summary.malformed);
    }
    if summary.duplicates > 0 {
        println!("Duplicates:       {}", summary.duplicates);
    }
    if summary.skipped_complete > 0 {
        println!("Skipped complete: {}", summary.skipped_complete);
    }
    if !summary.missing_books.is_empty() {
        println!("Missing books:    {}", summary.missing_books.join(", "));
    }
    println!("Mean similarity:  {:.4}", summary.mean_similarity);
    println!("Elapsed:          {:.2}s", summary.elapsed_secs);
}

fn print_tsv_summary(summary: &RunSummary) {
    println!(
        "records\tmatched\tnot_found\tkept\tmalformed\tduplicates\tskipped_complete\tmissing_books\tmean_similarity\telapsed_secs"
    );
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.6}\t{:.3}",
        summary.records,
        summary.matched,
        summary.not_found,
        summary.kept,
        summary.malformed,
        summary.duplicates,
        summary.skipped_complete,
        summary.missing_books.join(","),
        summary.mean_similarity,
        summary.elapsed_secs
    );
}
