//! Ask command implementation.

use anyhow::Result;

use crate::cli::output::{OutputFormat, get_formatter};
use crate::models::Config;

use super::build_pipeline;

pub async fn handle_ask(
    question: String,
    source: Option<String>,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let pipeline = build_pipeline(&config)?;

    if verbose {
        if let Some(ref source) = source {
            println!("Filtering retrieval to source: {}", source);
        }
    }

    let envelope = pipeline.answer(&question, source.as_deref()).await;
    print!("{}", formatter.format_answer(&envelope));

    Ok(())
}
