//! Query-side models: retrieval results, citations, and the answer envelope.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One record returned from a similarity search. Ephemeral; created per query
/// and discarded after answer assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_id: String,
    pub score: f32,
    pub content: String,
    pub source: String,
    /// 1-based page number, as persisted.
    pub page: u32,
}

/// A deduplicated (filename, page) reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    pub page: u32,
}

impl std::fmt::Display for Citation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, page {}", self.source, self.page)
    }
}

/// The final response to a question: free-text answer plus sorted, distinct
/// source citations. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEnvelope {
    pub answer: String,
    pub citations: Vec<Citation>,
}

impl AnswerEnvelope {
    /// Assemble an envelope from the chunks the model actually grounded on.
    /// Citations are deduplicated and sorted by (source, page); page numbers
    /// are taken as-is since storage is already 1-based.
    pub fn from_grounding(answer: String, grounding: &[RetrievedChunk]) -> Self {
        let citations: BTreeSet<Citation> = grounding
            .iter()
            .map(|chunk| Citation {
                source: chunk.source.clone(),
                page: chunk.page,
            })
            .collect();

        Self {
            answer,
            citations: citations.into_iter().collect(),
        }
    }

    /// Envelope carrying a printable failure message. Interactive callers
    /// always get a response they can display, never a raised error.
    pub fn from_error(message: impl std::fmt::Display) -> Self {
        Self {
            answer: format!("Unable to answer: {}", message),
            citations: Vec::new(),
        }
    }
}
