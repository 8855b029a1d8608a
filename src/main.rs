use clap::Parser;
use tracing_subscriber::EnvFilter;

use phrase_aligner::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("phrase_aligner=debug,info")
    } else {
        EnvFilter::new("phrase_aligner=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Align(args) => cli::align::run(args, cli.format)?,
        cli::Commands::Folder(args) => cli::folder::run(args, cli.format)?,
        cli::Commands::Dataset(args) => cli::dataset::run(args, cli.format)?,
        cli::Commands::Segments(args) => cli::segments::run(args, cli.format)?,
    }

    Ok(())
}
