//! Question answering over PDF corpora.
//!
//! ```text
//! PDF directory ──► sources::PdfTextLoader ──► pages
//!                                               │
//! pages ──► services::PageChunker ──► ordered chunk sequence
//!                                               │
//! chunks ──► services::BatchIngestor ──► services::SqliteStore
//!            (token-budget throttled)           │
//!                                               ▼
//! question ──► services::QueryEngine ──► AnswerEnvelope with citations
//! ```

pub mod cli;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod sources;
pub mod utils;

pub use error::AppError;
pub use models::{AnswerEnvelope, Citation, Config};
pub use pipeline::Pipeline;
