mod answer;
mod config;
mod document;

pub use answer::{AnswerEnvelope, Citation, RetrievedChunk};
pub use config::{
    ChunkingConfig, Config, EmbeddingConfig, IngestConfig, ModelConfig, QueryConfig,
    VectorStoreConfig,
};
pub use document::{Chunk, EmbeddingRecord, LoadedDocument, PageText};
