//! Error types for the document QA pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors loading a single document from disk.
///
/// Load errors are reported and the offending document is skipped; they never
/// abort ingestion of the remaining documents.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to extract text from {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },

    #[error("no text extracted from {path}")]
    NoText { path: PathBuf },
}

/// Errors related to embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to connect to embedding endpoint: {0}")]
    ConnectionError(String),

    #[error("embedding endpoint error: {0}")]
    ServerError(String),

    #[error("embedding request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("embedding request timed out")]
    Timeout,
}

/// Errors related to the answering model.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("failed to connect to model endpoint: {0}")]
    ConnectionError(String),

    #[error("model endpoint error: {0}")]
    ServerError(String),

    #[error("completion request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid completion response: {0}")]
    InvalidResponse(String),

    #[error("completion request timed out")]
    Timeout,
}

/// Errors related to vector store operations.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    /// Append was attempted before the collection was created. This is a
    /// sequencing bug in the caller and is never recovered from automatically.
    #[error("collection is not bound to an embedding model; create it before appending")]
    UnboundCollection,

    #[error("collection is bound to embedding model '{bound}', got '{requested}'")]
    ModelMismatch { bound: String, requested: String },

    #[error("embedding dimension mismatch: collection expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Errors related to ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Ingestion was explicitly requested but the source yielded zero chunks.
    /// Listing or querying an empty store is never an error; only an explicit
    /// ingest call surfaces this.
    #[error("no documents found to ingest")]
    NoDocumentsFound,

    #[error("directory walk error: {0}")]
    WalkError(String),

    #[error("tokenizer init error: {0}")]
    Tokenizer(String),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("path error: {0}")]
    PathError(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Application-level errors that wrap domain errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error("{0}")]
    Other(String),
}
