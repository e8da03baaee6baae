//! Token-budget batch ingestion into the vector store.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::error::IngestError;
use crate::models::{Chunk, EmbeddingRecord, IngestConfig};
use crate::services::embedding::Embedder;
use crate::services::tokens::{TokenBudget, TokenCounter};
use crate::services::vector_store::VectorStore;

/// Counters describing one ingestion run.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct IngestReport {
    pub documents: u64,
    pub pages: u64,
    pub chunks: u64,
    pub batches: u64,
    pub tokens: u64,
}

/// Consumes an ordered chunk sequence and materializes it into the vector
/// store, embedding fixed-size batches strictly in order while honouring the
/// embedding service's per-minute token budget.
pub struct BatchIngestor {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    counter: TokenCounter,
    batch_size: usize,
    max_tokens_per_minute: usize,
}

impl BatchIngestor {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        config: &IngestConfig,
    ) -> Result<Self, IngestError> {
        Ok(Self {
            embedder,
            store,
            counter: TokenCounter::new()?,
            batch_size: config.batch_size,
            max_tokens_per_minute: config.max_tokens_per_minute,
        })
    }

    /// Embed and store every chunk, exactly once, in sequence order.
    ///
    /// An empty input is a no-op. Embedding failures propagate unchanged with
    /// no chunk silently skipped; the recovery path is an explicit re-invocation
    /// by the caller, which will re-append the whole corpus.
    pub async fn run(&self, chunks: Vec<Chunk>) -> Result<IngestReport, IngestError> {
        let mut report = IngestReport {
            chunks: chunks.len() as u64,
            ..Default::default()
        };
        if chunks.is_empty() {
            return Ok(report);
        }

        info!(
            chunks = chunks.len(),
            batch_size = self.batch_size,
            "starting ingestion"
        );

        let mut budget = TokenBudget::new(self.max_tokens_per_minute, Instant::now());
        let mut bound = false;

        for (batch_index, batch) in chunks.chunks(self.batch_size).enumerate() {
            let batch_tokens = self
                .counter
                .count_batch(batch.iter().map(|c| c.content.as_str()));

            // Hard backpressure: never submit a batch that would foreseeably
            // exceed the window budget without waiting the window out first.
            if let Some(wait) = budget.check(batch_tokens, Instant::now()) {
                info!(
                    batch = batch_index + 1,
                    wait_secs = wait.as_secs_f64(),
                    used = budget.used(),
                    batch_tokens,
                    "token budget reached, waiting"
                );
                tokio::time::sleep(wait).await;
                budget.reset(Instant::now());
            }

            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed_batch(texts).await?;

            if embeddings.len() != batch.len() {
                return Err(IngestError::Embedding(
                    crate::error::EmbeddingError::InvalidResponse(format!(
                        "batch {} returned {} embeddings for {} chunks",
                        batch_index + 1,
                        embeddings.len(),
                        batch.len()
                    )),
                ));
            }

            if !bound {
                let dimension = embeddings.first().map(Vec::len).unwrap_or(0);
                self.store
                    .create(self.embedder.model_name(), dimension)
                    .await?;
                bound = true;
            }

            let records: Vec<EmbeddingRecord> = batch
                .iter()
                .cloned()
                .zip(embeddings)
                .map(|(chunk, vector)| EmbeddingRecord::new(chunk, vector))
                .collect();
            self.store.append(records).await?;

            budget.record(batch_tokens);
            report.batches += 1;
            report.tokens += batch_tokens as u64;
            info!(
                batch = batch_index + 1,
                chunks = batch.len(),
                tokens = batch_tokens,
                "ingested batch"
            );
        }

        Ok(report)
    }
}
