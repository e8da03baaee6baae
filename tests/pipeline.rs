//! End-to-end pipeline tests with in-memory collaborators.
//!
//! The loader, embedder, and answering model are all mocked so the full
//! ingest-then-ask path runs without pdftotext or a network.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use docqa::error::{CompletionError, EmbeddingError, IngestError, LoadError};
use docqa::models::{Config, LoadedDocument, PageText, RetrievedChunk};
use docqa::services::{AnsweringModel, Completion, Embedder, SqliteStore};
use docqa::sources::DocumentLoader;
use docqa::Pipeline;

/// Serves canned page text keyed by filename.
struct FixtureLoader {
    documents: HashMap<String, Vec<&'static str>>,
}

impl FixtureLoader {
    fn new(documents: HashMap<String, Vec<&'static str>>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl DocumentLoader for FixtureLoader {
    async fn load(&self, path: &Path) -> Result<LoadedDocument, LoadError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let pages = self
            .documents
            .get(&filename)
            .ok_or_else(|| LoadError::Extraction {
                path: path.to_path_buf(),
                reason: "no fixture for file".to_string(),
            })?;

        Ok(LoadedDocument {
            filename,
            pages: pages
                .iter()
                .enumerate()
                .map(|(index, text)| PageText {
                    index: index as u32,
                    text: (*text).to_string(),
                })
                .collect(),
        })
    }
}

/// Deterministic embedder: a fixed-dimension vector derived from the text
/// bytes, so identical text always lands on the same point.
struct HashEmbedder;

fn hash_vector(text: &str) -> Vec<f32> {
    let mut vector = [1.0f32; 4];
    for (i, byte) in text.bytes().enumerate() {
        vector[i % 4] += byte as f32 / 255.0;
    }
    vector.to_vec()
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| hash_vector(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(hash_vector(text))
    }

    fn model_name(&self) -> &str {
        "hash-embedder"
    }
}

/// Echoes the question back and grounds on every supplied chunk.
struct EchoModel;

#[async_trait]
impl AnsweringModel for EchoModel {
    async fn complete(
        &self,
        question: &str,
        context: &[RetrievedChunk],
    ) -> Result<Completion, CompletionError> {
        Ok(Completion {
            answer: format!("echo: {}", question),
            grounding: context.to_vec(),
        })
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.chunking.chunk_size = 200;
    config.chunking.chunk_overlap = 20;
    config.ingest.batch_size = 10;
    config.query.top_k = 5;
    config
}

fn build_pipeline(documents: HashMap<String, Vec<&'static str>>) -> Pipeline {
    let store = SqliteStore::open_in_memory().unwrap();
    Pipeline::new(
        test_config(),
        Arc::new(FixtureLoader::new(documents)),
        Arc::new(HashEmbedder),
        Arc::new(EchoModel),
        Arc::new(store),
    )
    .unwrap()
}

/// Drops empty placeholder PDFs into `dir` so directory discovery finds them.
fn touch_pdfs(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"").unwrap();
    }
}

#[tokio::test]
async fn test_ingest_then_coverage() {
    let dir = tempfile::tempdir().unwrap();
    touch_pdfs(dir.path(), &["report.pdf"]);

    let mut documents = HashMap::new();
    documents.insert(
        "report.pdf".to_string(),
        vec![
            "Revenue grew twelve percent in the first quarter.",
            "Headcount stayed flat across all regions.",
            "The outlook section projects modest growth.",
        ],
    );
    let pipeline = build_pipeline(documents);

    let report = pipeline.ingest(dir.path()).await.unwrap();
    assert_eq!(report.documents, 1);
    assert_eq!(report.pages, 3);
    assert_eq!(report.chunks, 3);
    assert!(report.tokens > 0);

    let coverage = pipeline.coverage().await.unwrap();
    assert_eq!(coverage.len(), 1);
    assert_eq!(coverage.get("report.pdf"), Some(&3));
}

#[tokio::test]
async fn test_answer_cites_one_based_pages() {
    let dir = tempfile::tempdir().unwrap();
    touch_pdfs(dir.path(), &["report.pdf"]);

    let mut documents = HashMap::new();
    documents.insert(
        "report.pdf".to_string(),
        vec!["First page content here.", "Second page content here."],
    );
    let pipeline = build_pipeline(documents);
    pipeline.ingest(dir.path()).await.unwrap();

    let envelope = pipeline.answer("What is on the pages?", None).await;
    assert_eq!(envelope.answer, "echo: What is on the pages?");
    assert!(!envelope.citations.is_empty());
    for citation in &envelope.citations {
        assert_eq!(citation.source, "report.pdf");
        assert!(citation.page >= 1, "citations must use 1-based pages");
    }
}

#[tokio::test]
async fn test_filename_in_question_restricts_retrieval() {
    let dir = tempfile::tempdir().unwrap();
    touch_pdfs(dir.path(), &["alpha.pdf", "beta.pdf"]);

    let mut documents = HashMap::new();
    documents.insert(
        "alpha.pdf".to_string(),
        vec!["Alpha document discusses cats."],
    );
    documents.insert(
        "beta.pdf".to_string(),
        vec!["Beta document discusses dogs."],
    );
    let pipeline = build_pipeline(documents);
    pipeline.ingest(dir.path()).await.unwrap();

    // Detection is case-insensitive on the stored filename.
    let envelope = pipeline.answer("What does ALPHA.PDF talk about?", None).await;
    assert!(!envelope.citations.is_empty());
    for citation in &envelope.citations {
        assert_eq!(citation.source, "alpha.pdf");
    }
}

#[tokio::test]
async fn test_explicit_source_filter() {
    let dir = tempfile::tempdir().unwrap();
    touch_pdfs(dir.path(), &["alpha.pdf", "beta.pdf"]);

    let mut documents = HashMap::new();
    documents.insert("alpha.pdf".to_string(), vec!["Alpha content."]);
    documents.insert("beta.pdf".to_string(), vec!["Beta content."]);
    let pipeline = build_pipeline(documents);
    pipeline.ingest(dir.path()).await.unwrap();

    let envelope = pipeline
        .answer("Summarize the document.", Some("beta.pdf"))
        .await;
    assert!(!envelope.citations.is_empty());
    for citation in &envelope.citations {
        assert_eq!(citation.source, "beta.pdf");
    }
}

#[tokio::test]
async fn test_ingest_empty_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = build_pipeline(HashMap::new());

    let result = pipeline.ingest(dir.path()).await;
    assert!(matches!(result, Err(IngestError::NoDocumentsFound)));
}

#[tokio::test]
async fn test_unreadable_document_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    touch_pdfs(dir.path(), &["good.pdf", "broken.pdf"]);

    // Only good.pdf has a fixture; broken.pdf fails to load.
    let mut documents = HashMap::new();
    documents.insert("good.pdf".to_string(), vec!["Readable content."]);
    let pipeline = build_pipeline(documents);

    let report = pipeline.ingest(dir.path()).await.unwrap();
    assert_eq!(report.documents, 1);

    let coverage = pipeline.coverage().await.unwrap();
    assert!(coverage.contains_key("good.pdf"));
    assert!(!coverage.contains_key("broken.pdf"));
}

#[tokio::test]
async fn test_answer_on_empty_store_returns_envelope() {
    let pipeline = build_pipeline(HashMap::new());

    let envelope = pipeline.answer("Anything indexed?", None).await;
    assert_eq!(envelope.answer, "echo: Anything indexed?");
    assert!(envelope.citations.is_empty());
}

#[tokio::test]
async fn test_reingest_appends_rather_than_replaces() {
    let dir = tempfile::tempdir().unwrap();
    touch_pdfs(dir.path(), &["report.pdf"]);

    let mut documents = HashMap::new();
    documents.insert("report.pdf".to_string(), vec!["Single page."]);
    let pipeline = build_pipeline(documents);

    pipeline.ingest(dir.path()).await.unwrap();
    pipeline.ingest(dir.path()).await.unwrap();

    // Coverage counts distinct pages, so duplicates collapse there.
    let coverage = pipeline.coverage().await.unwrap();
    assert_eq!(coverage.get("report.pdf"), Some(&1));
}
