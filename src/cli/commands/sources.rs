//! Sources command implementation.

use anyhow::{Context, Result};

use crate::cli::output::{OutputFormat, get_formatter};
use crate::models::Config;

use super::build_pipeline;

pub async fn handle_sources(format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let pipeline = build_pipeline(&config)?;
    let coverage = pipeline
        .coverage()
        .await
        .context("failed to list ingested sources")?;

    print!("{}", formatter.format_coverage(&coverage));
    Ok(())
}
