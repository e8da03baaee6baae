//! Vector store abstraction layer.
//!
//! A collection is a persistent, append-only set of embedded chunks bound to
//! exactly one embedding model for its lifetime. The ingestor creates and
//! appends; the query engine only reads.

mod sqlite;

pub use sqlite::SqliteStore;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::VectorStoreError;
use crate::models::{EmbeddingRecord, RetrievedChunk};

/// Abstract trait for vector store operations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Bind the collection to an embedding model and vector dimension.
    /// Idempotent for a matching model; fails with
    /// [`VectorStoreError::ModelMismatch`] if the collection is already bound
    /// to a different one.
    async fn create(&self, embedding_model: &str, dimension: usize)
    -> Result<(), VectorStoreError>;

    /// Append records to the collection. Records are never mutated or
    /// deduplicated; re-ingesting the same corpus appends it again. Fails with
    /// [`VectorStoreError::UnboundCollection`] before [`create`](Self::create).
    async fn append(&self, records: Vec<EmbeddingRecord>) -> Result<(), VectorStoreError>;

    /// Return up to `limit` records ranked by cosine similarity to
    /// `query_vector`. When `source_filter` is set, only records with that
    /// exact filename are eligible, so fewer than `limit` may come back.
    async fn search(
        &self,
        query_vector: Vec<f32>,
        limit: usize,
        source_filter: Option<&str>,
    ) -> Result<Vec<RetrievedChunk>, VectorStoreError>;

    /// Distinct page count per filename. Repeated pages from multiple chunks
    /// are counted once; records with missing page metadata are skipped.
    async fn list_sources(&self) -> Result<BTreeMap<String, u64>, VectorStoreError>;

    /// Total number of stored records.
    async fn count(&self) -> Result<u64, VectorStoreError>;
}

/// Cosine similarity between two vectors, 0.0 for degenerate input.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
