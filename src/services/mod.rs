mod answering;
mod chunker;
mod embedding;
mod engine;
mod ingestor;
mod tokens;
mod vector_store;

pub use answering::{AnsweringModel, Completion, HttpChatModel};
pub use chunker::PageChunker;
pub use embedding::{Embedder, HttpEmbedder};
pub use engine::QueryEngine;
pub use ingestor::{BatchIngestor, IngestReport};
pub use tokens::{RATE_LIMIT_WINDOW, TokenBudget, TokenCounter};
pub use vector_store::{SqliteStore, VectorStore};
