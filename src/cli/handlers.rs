use anyhow::{Context, Result};
use std::time::Instant;
use tracing::info;

use super::args::{AddArgs, Cli, Commands, RemoveArgs};
use super::setup::get_worker_count;
use crate::io::find_php_files;
use crate::pipeline::{Pipeline, RunSummary};

/// Dispatch a parsed command line and report the run.
pub fn run(cli: Cli) -> Result<()> {
    let pipeline = Pipeline::new(!cli.no_parallel);
    if !cli.no_parallel {
        info!(workers = get_worker_count(cli.jobs), "Running in parallel");
    }

    let start = Instant::now();
    let summary = match &cli.command {
        Commands::Add(args) => handle_add(args, &pipeline)?,
        Commands::Remove(args) => handle_remove(args, &pipeline)?,
    };

    println!(
        "Took: {:.3}s ({} files scanned, {} changed, {} skipped)",
        start.elapsed().as_secs_f64(),
        summary.scanned,
        summary.changed,
        summary.skipped
    );
    Ok(())
}

pub fn handle_add(args: &AddArgs, pipeline: &Pipeline) -> Result<RunSummary> {
    let file_config = args.file_config().context("Failed to load config file")?;
    let options = args
        .hint_options(file_config.as_ref())
        .context("Invalid hint options")?;
    info!(?options, "Resolved hint options");

    let files = find_php_files(&args.dirs, &args.exclude_patterns(file_config.as_ref()))
        .context("Failed to discover PHP files")?;
    pipeline
        .add(&files, &options)
        .context("Failed to add type hints")
}

pub fn handle_remove(args: &RemoveArgs, pipeline: &Pipeline) -> Result<RunSummary> {
    let files =
        find_php_files(&args.dirs, &args.exclude).context("Failed to discover PHP files")?;
    pipeline.remove(&files).context("Failed to remove type hints")
}
