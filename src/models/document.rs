use serde::{Deserialize, Serialize};

/// One physical page of a source document, as extracted at load time.
///
/// The index is 0-based and exists only between extraction and chunking;
/// everything persisted downstream carries 1-based page numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub index: u32,
    pub text: String,
}

/// A source document decoded into an ordered page sequence.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Filename without directory components; unique within a corpus.
    pub filename: String,
    pub pages: Vec<PageText>,
}

impl LoadedDocument {
    pub fn new(filename: impl Into<String>, pages: Vec<PageText>) -> Self {
        Self {
            filename: filename.into(),
            pages,
        }
    }
}

/// A bounded span of page text carrying source and page provenance.
///
/// Immutable once created. `page` is 1-based; the 0-to-1 conversion happens
/// here, at creation, and nowhere else in the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    /// Owning filename.
    pub source: String,
    /// 1-based page number.
    pub page: u32,
    /// Position within the page's chunk sequence.
    pub chunk_index: u32,
    pub content: String,
    pub created_at: String,
}

impl Chunk {
    /// Build a chunk from a 0-based page index. Each call mints a fresh id so
    /// repeated ingestion of the same corpus appends new records rather than
    /// overwriting old ones.
    pub fn from_page(source: &str, page_index: u32, chunk_index: u32, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source: source.to_string(),
            page: page_index + 1,
            chunk_index,
            content,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A chunk paired with its embedding, as stored in the vector store.
#[derive(Debug, Clone)]
pub struct EmbeddingRecord {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

impl EmbeddingRecord {
    pub fn new(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self { chunk, vector }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_is_one_based() {
        let chunk = Chunk::from_page("a.pdf", 0, 0, "text".to_string());
        assert_eq!(chunk.page, 1);

        let chunk = Chunk::from_page("a.pdf", 7, 2, "text".to_string());
        assert_eq!(chunk.page, 8);
    }

    #[test]
    fn test_chunk_ids_are_unique() {
        let a = Chunk::from_page("a.pdf", 0, 0, "same".to_string());
        let b = Chunk::from_page("a.pdf", 0, 0, "same".to_string());
        assert_ne!(a.id, b.id);
    }
}
