mod ask;
mod config;
mod ingest;
mod sources;

pub use ask::handle_ask;
pub use config::{ConfigCommand, handle_config};
pub use ingest::handle_ingest;
pub use sources::handle_sources;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::models::Config;
use crate::pipeline::Pipeline;
use crate::services::{HttpChatModel, HttpEmbedder, SqliteStore};
use crate::sources::PdfTextLoader;

const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Wire up the pipeline from configuration. Service handles are constructed
/// here, once, and injected; their lifecycle is owned by the command.
pub fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let api_key = std::env::var(API_KEY_ENV).ok();

    let embedder = HttpEmbedder::new(&config.embedding, api_key.clone())
        .context("failed to construct embedding client")?;
    let model = HttpChatModel::new(&config.model, api_key)
        .context("failed to construct answering model client")?;
    let store = SqliteStore::open(&config.vector_store.persist_path)
        .context("failed to open vector store")?;

    Pipeline::new(
        config.clone(),
        Arc::new(PdfTextLoader::new()),
        Arc::new(embedder),
        Arc::new(model),
        Arc::new(store),
    )
    .context("invalid configuration")
}
