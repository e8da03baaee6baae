//! The exposed surface of the crate: ingest, coverage, answer.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{ConfigError, IngestError, VectorStoreError};
use crate::models::{AnswerEnvelope, Chunk, Config, LoadedDocument};
use crate::services::{
    AnsweringModel, BatchIngestor, Embedder, IngestReport, PageChunker, QueryEngine, VectorStore,
};
use crate::sources::{DocumentLoader, collect_pdf_files};

/// Ingestion-and-retrieval pipeline over one corpus.
///
/// All collaborators are constructed by the caller and injected; the pipeline
/// holds no process-global state. The configuration is immutable after
/// construction; reloading means building a new `Pipeline`.
pub struct Pipeline {
    config: Config,
    loader: Arc<dyn DocumentLoader>,
    chunker: PageChunker,
    ingestor: BatchIngestor,
    engine: QueryEngine,
}

impl Pipeline {
    pub fn new(
        config: Config,
        loader: Arc<dyn DocumentLoader>,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn AnsweringModel>,
        store: Arc<dyn VectorStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let chunker = PageChunker::new(&config.chunking)?;
        let ingestor = BatchIngestor::new(embedder.clone(), store.clone(), &config.ingest)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        let engine = QueryEngine::new(embedder, store, model, &config.query);

        Ok(Self {
            config,
            loader,
            chunker,
            ingestor,
            engine,
        })
    }

    /// Ingest every PDF under `dir` into the vector store.
    ///
    /// Documents that fail to load are reported and skipped without aborting
    /// the rest. An explicitly requested ingestion that produces zero chunks
    /// fails with [`IngestError::NoDocumentsFound`]; re-running against an
    /// already ingested corpus appends it again (no content dedup).
    pub async fn ingest(&self, dir: &Path) -> Result<IngestReport, IngestError> {
        let files = collect_pdf_files(dir, &self.config.ingest.exclude_patterns)?;
        info!(dir = %dir.display(), files = files.len(), "discovered documents");

        let mut documents: Vec<LoadedDocument> = Vec::new();
        for path in &files {
            match self.loader.load(path).await {
                Ok(document) => documents.push(document),
                Err(e) => {
                    // Malformed files never abort the batch.
                    warn!(path = %path.display(), error = %e, "skipping unreadable document");
                }
            }
        }

        let chunks: Vec<Chunk> = self.chunker.chunk_documents(&documents);
        if chunks.is_empty() {
            return Err(IngestError::NoDocumentsFound);
        }

        let mut report = self.ingestor.run(chunks).await?;
        report.documents = documents.len() as u64;
        report.pages = documents.iter().map(|d| d.pages.len() as u64).sum();
        Ok(report)
    }

    /// Distinct page count per ingested filename. Never an error for an empty
    /// store; the mapping is simply empty.
    pub async fn coverage(&self) -> Result<BTreeMap<String, u64>, VectorStoreError> {
        self.engine.coverage().await
    }

    /// Answer a question, optionally restricted to one source file. Always
    /// returns a printable envelope, never an error.
    pub async fn answer(&self, question: &str, source_filter: Option<&str>) -> AnswerEnvelope {
        self.engine.answer(question, source_filter).await
    }
}
