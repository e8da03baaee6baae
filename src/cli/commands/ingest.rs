//! Ingest command implementation.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::output::{OutputFormat, get_formatter};
use crate::models::Config;

use super::build_pipeline;

pub async fn handle_ingest(dir: PathBuf, format: OutputFormat, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);
    let start_time = Instant::now();

    let dir = dir.canonicalize().context("invalid directory")?;
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    if verbose {
        println!("Ingesting PDFs from {}", dir.display());
        println!(
            "Vector store: {}",
            config.vector_store.persist_path.display()
        );
    }

    let pipeline = build_pipeline(&config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    spinner.set_message("embedding and indexing...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));

    let result = pipeline.ingest(&dir).await;
    spinner.finish_and_clear();

    let report = result.context("ingestion failed")?;

    print!("{}", formatter.format_ingest_report(&report));
    if verbose {
        println!("Duration: {}ms", start_time.elapsed().as_millis());
    }

    Ok(())
}
