//! Page-aware text chunking with overlap.

use tracing::warn;

use crate::error::ConfigError;
use crate::models::{Chunk, ChunkingConfig, LoadedDocument};
use crate::utils::has_meaningful_content;

/// Splits document pages into overlapping chunks, attaching 1-based page
/// provenance to every chunk.
#[derive(Debug, Clone)]
pub struct PageChunker {
    /// Target chunk size in characters.
    chunk_size: usize,
    /// Overlap size in characters, strictly less than `chunk_size`.
    overlap: usize,
}

impl PageChunker {
    /// Create a chunker from configuration. Rejects `chunk_overlap >=
    /// chunk_size`; a step of zero or less would never advance.
    pub fn new(config: &ChunkingConfig) -> Result<Self, ConfigError> {
        if config.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "chunk_overlap ({}) must be strictly less than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        Ok(Self {
            chunk_size: config.chunk_size,
            overlap: config.chunk_overlap,
        })
    }

    /// Chunk every document in input order. Documents with no pages are
    /// skipped with a warning; the rest of the set is unaffected. Output order
    /// is document order, then page order, then intra-page order, which the
    /// batch ingestor relies on when slicing into fixed-size batches.
    pub fn chunk_documents(&self, documents: &[LoadedDocument]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for document in documents {
            chunks.extend(self.chunk_document(document));
        }
        chunks
    }

    /// Chunk a single document, page by page.
    pub fn chunk_document(&self, document: &LoadedDocument) -> Vec<Chunk> {
        if document.pages.is_empty() {
            warn!(source = %document.filename, "document yielded no pages, skipping");
            return Vec::new();
        }

        let mut chunks = Vec::new();
        for page in &document.pages {
            let mut chunk_index = 0u32;
            for span in self.split_with_overlap(&page.text) {
                if !has_meaningful_content(&span) {
                    continue;
                }
                chunks.push(Chunk::from_page(
                    &document.filename,
                    page.index,
                    chunk_index,
                    span,
                ));
                chunk_index += 1;
            }
        }

        if chunks.is_empty() {
            warn!(source = %document.filename, "document yielded no chunks, skipping");
        }
        chunks
    }

    /// Split text into overlapping character spans, preferring natural break
    /// points near each span boundary.
    fn split_with_overlap(&self, content: &str) -> Vec<String> {
        let chars: Vec<char> = content.chars().collect();
        let total_chars = chars.len();
        let mut spans = Vec::new();

        if total_chars == 0 {
            return spans;
        }

        if total_chars <= self.chunk_size {
            spans.push(content.to_string());
            return spans;
        }

        let mut start = 0;

        while start < total_chars {
            let end = (start + self.chunk_size).min(total_chars);
            let adjusted_end = self.find_break_point(&chars, end, total_chars);

            spans.push(chars[start..adjusted_end].iter().collect());

            if adjusted_end >= total_chars {
                break;
            }
            // Advance from the realized end, not the nominal one: a break
            // point can pull the end back further than the overlap reaches,
            // and the text in between must still land in the next span.
            // The max(start + 1) keeps the cursor moving forward.
            start = adjusted_end.saturating_sub(self.overlap).max(start + 1);
        }

        spans
    }

    /// Find a natural break point near the target end position.
    /// Priority: paragraph break > newline > sentence end > space.
    fn find_break_point(&self, chars: &[char], target_end: usize, total: usize) -> usize {
        if target_end >= total {
            return total;
        }

        // Only look within the last 20% of the chunk.
        let search_start = target_end.saturating_sub(self.chunk_size / 5);
        let search_range = &chars[search_start..target_end];

        let mut best_break = None;
        let mut last_newline = None;
        let mut last_sentence = None;
        let mut last_space = None;

        for (i, c) in search_range.iter().enumerate() {
            let pos = search_start + i;
            match c {
                '\n' => {
                    if i > 0 && search_range.get(i.saturating_sub(1)) == Some(&'\n') {
                        best_break = Some(pos + 1);
                    }
                    last_newline = Some(pos + 1);
                }
                '.' | '!' | '?' => {
                    if search_range.get(i + 1).is_some_and(|c| c.is_whitespace()) {
                        last_sentence = Some(pos + 1);
                    }
                }
                ' ' | '\t' => {
                    last_space = Some(pos + 1);
                }
                _ => {}
            }
        }

        best_break
            .or(last_newline)
            .or(last_sentence)
            .or(last_space)
            .unwrap_or(target_end)
    }
}
