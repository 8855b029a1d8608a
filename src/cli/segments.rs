use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::core::segment::{Segment, SegmentList};
use crate::parsing::segments::parse_segments_file;

#[derive(Args)]
pub struct SegmentsArgs {
    /// Segment file with `filename<TAB>link<TAB>begin<TAB>end` lines
    pub input: PathBuf,

    /// Merge neighbours of one source separated by less than this many seconds
    #[arg(long)]
    pub merge_gap: Option<f64>,

    /// Print every segment instead of a summary
    #[arg(long)]
    pub list: bool,
}

#[derive(Debug, Serialize)]
struct SegmentsReport<'a> {
    segments: usize,
    sources: usize,
    merged: usize,
    total_duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    list: Option<&'a [Segment]>,
}

/// Execute segments subcommand
///
/// # Errors
///
/// Returns an error if the segment file cannot be parsed or `--merge-gap` is negative.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SegmentsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut segments = parse_segments_file(&args.input)?;

    let merged = match args.merge_gap {
        Some(gap) if gap.is_nan() || gap < 0.0 => {
            anyhow::bail!("--merge-gap must be a non-negative number")
        }
        Some(gap) => segments.merge_gaps_below(gap),
        None => 0,
    };

    let report = SegmentsReport {
        segments: segments.len(),
        sources: count_sources(&segments),
        merged,
        total_duration: segments.total_duration(),
        list: args.list.then(|| segments.segments()),
    };

    match format {
        OutputFormat::Text => print_text(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Tsv => print_tsv(&report),
    }
    Ok(())
}

fn count_sources(segments: &SegmentList) -> usize {
    segments
        .segments()
        .iter()
        .map(|s| s.source.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

fn print_text(report: &SegmentsReport<'_>) {
    if let Some(list) = report.list {
        for segment in list {
            println!(
                "{}  {:>9.3} - {:>9.3}  ({:.3}s)  {}",
                segment.id,
                segment.begin,
                segment.end,
                segment.duration(),
                segment.source
            );
        }
        println!();
    }
    println!("Segments:       {}", report.segments);
    println!("Sources:        {}", report.sources);
    if report.merged > 0 {
        println!("Merged:         {}", report.merged);
    }
    println!("Total duration: {:.3}s", report.total_duration);
}

fn print_tsv(report: &SegmentsReport<'_>) {
    match report.list {
        Some(list) => {
            println!("filename\tlink\tbegin\tend");
            for segment in list {
                println!(
                    "{}\t{}\t{}\t{}",
                    segment.id, segment.source, segment.begin, segment.end
                );
            }
        }
        None => {
            println!("segments\tsources\tmerged\ttotal_duration");
            println!(
                "{}\t{}\t{}\t{:.3}",
                report.segments, report.sources, report.merged, report.total_duration
            );
        }
    }
}
