//! Retrieval query engine: question in, cited answer out.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::VectorStoreError;
use crate::models::{AnswerEnvelope, QueryConfig};
use crate::services::answering::AnsweringModel;
use crate::services::embedding::Embedder;
use crate::services::vector_store::VectorStore;

/// Read-path engine over the shared vector store. Queries only read; they may
/// observe a partially ingested corpus while ingestion is running, which is an
/// accepted trade-off rather than a bug.
pub struct QueryEngine {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    model: Arc<dyn AnsweringModel>,
    top_k: usize,
}

impl QueryEngine {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        model: Arc<dyn AnsweringModel>,
        config: &QueryConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            model,
            top_k: config.top_k,
        }
    }

    /// Answer a question over the corpus.
    ///
    /// Never returns an error: any internal failure is embedded as a printable
    /// message in the envelope's answer field so interactive callers always
    /// get a displayable response.
    pub async fn answer(&self, question: &str, source_filter: Option<&str>) -> AnswerEnvelope {
        let filter = match source_filter {
            Some(explicit) => Some(explicit.to_string()),
            None => match self.store.list_sources().await {
                Ok(sources) => detect_source_filter(question, sources.keys()),
                Err(e) => {
                    warn!(error = %e, "could not list sources for filter auto-detection");
                    None
                }
            },
        };
        if let Some(ref source) = filter {
            debug!(source = %source, "retrieving with source filter");
        }

        let query_vector = match self.embedder.embed_query(question).await {
            Ok(v) => v,
            Err(e) => return AnswerEnvelope::from_error(e),
        };

        let retrieved = match self
            .store
            .search(query_vector, self.top_k, filter.as_deref())
            .await
        {
            Ok(r) => r,
            Err(e) => return AnswerEnvelope::from_error(e),
        };

        // Zero retrieved chunks is not an error; the model is still invoked
        // with empty context and may decline to answer.
        match self.model.complete(question, &retrieved).await {
            Ok(completion) => {
                AnswerEnvelope::from_grounding(completion.answer, &completion.grounding)
            }
            Err(e) => AnswerEnvelope::from_error(e),
        }
    }

    /// Corpus coverage: distinct page count per filename.
    pub async fn coverage(&self) -> Result<BTreeMap<String, u64>, VectorStoreError> {
        self.store.list_sources().await
    }
}

/// Detect a target filename mentioned in the question by case-insensitive
/// substring match. First match wins, in iteration order over the known
/// filenames; when several filenames could match, that order is the only
/// tie-break (a documented ambiguity of the lookup, kept as-is).
pub(crate) fn detect_source_filter<'a>(
    question: &str,
    known_sources: impl IntoIterator<Item = &'a String>,
) -> Option<String> {
    let question = question.to_lowercase();
    known_sources
        .into_iter()
        .find(|source| question.contains(&source.to_lowercase()))
        .cloned()
}
