//! SQLite-backed vector store.
//!
//! Embeddings live in a single database file at the configured persist path,
//! stored as little-endian f32 blobs; similarity is computed in process. The
//! connection sits behind an async mutex so concurrent readers are safe, and
//! ingestion appending while queries run simply exposes a partially ingested
//! corpus.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use tokio::sync::Mutex;

use super::{VectorStore, cosine_similarity};
use crate::error::VectorStoreError;
use crate::models::{EmbeddingRecord, RetrievedChunk};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS collection_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    embedding_model TEXT NOT NULL,
    dimension INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    source TEXT NOT NULL,
    page INTEGER,
    chunk_index INTEGER NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source);
"#;

#[derive(Debug, Clone)]
struct CollectionMeta {
    embedding_model: String,
    dimension: usize,
}

/// SQLite vector store backend.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at `path`. A nonexistent or empty file is a
    /// valid empty collection, not an error.
    pub fn open(path: &Path) -> Result<Self, VectorStoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| VectorStoreError::Corrupt(format!("cannot create {}: {}", parent.display(), e)))?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self, VectorStoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn meta(conn: &Connection) -> Result<Option<CollectionMeta>, VectorStoreError> {
        let meta = conn
            .query_row(
                "SELECT embedding_model, dimension FROM collection_meta WHERE id = 1",
                [],
                |row| {
                    Ok(CollectionMeta {
                        embedding_model: row.get(0)?,
                        dimension: row.get::<_, i64>(1)? as usize,
                    })
                },
            )
            .optional()?;
        Ok(meta)
    }
}

fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

fn blob_to_vector(blob: &[u8]) -> Result<Vec<f32>, VectorStoreError> {
    if blob.len() % 4 != 0 {
        return Err(VectorStoreError::Corrupt(format!(
            "embedding blob length {} is not a multiple of 4",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn create(
        &self,
        embedding_model: &str,
        dimension: usize,
    ) -> Result<(), VectorStoreError> {
        let conn = self.conn.lock().await;

        if let Some(meta) = Self::meta(&conn)? {
            if meta.embedding_model != embedding_model {
                return Err(VectorStoreError::ModelMismatch {
                    bound: meta.embedding_model,
                    requested: embedding_model.to_string(),
                });
            }
            if meta.dimension != dimension {
                return Err(VectorStoreError::DimensionMismatch {
                    expected: meta.dimension,
                    actual: dimension,
                });
            }
            return Ok(());
        }

        conn.execute(
            "INSERT INTO collection_meta (id, embedding_model, dimension, created_at)
             VALUES (1, ?1, ?2, ?3)",
            params![
                embedding_model,
                dimension as i64,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    async fn append(&self, records: Vec<EmbeddingRecord>) -> Result<(), VectorStoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock().await;

        let meta = Self::meta(&conn)?.ok_or(VectorStoreError::UnboundCollection)?;
        for record in &records {
            if record.vector.len() != meta.dimension {
                return Err(VectorStoreError::DimensionMismatch {
                    expected: meta.dimension,
                    actual: record.vector.len(),
                });
            }
        }

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO chunks (id, source, page, chunk_index, content, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for record in &records {
                stmt.execute(params![
                    record.chunk.id,
                    record.chunk.source,
                    record.chunk.page as i64,
                    record.chunk.chunk_index as i64,
                    record.chunk.content,
                    vector_to_blob(&record.vector),
                    record.chunk.created_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    async fn search(
        &self,
        query_vector: Vec<f32>,
        limit: usize,
        source_filter: Option<&str>,
    ) -> Result<Vec<RetrievedChunk>, VectorStoreError> {
        let conn = self.conn.lock().await;

        let mut scored: Vec<RetrievedChunk> = Vec::new();
        let mut collect = |row: &rusqlite::Row<'_>| -> rusqlite::Result<()> {
            let id: String = row.get(0)?;
            let source: String = row.get(1)?;
            let page: Option<i64> = row.get(2)?;
            let content: String = row.get(3)?;
            let blob: Vec<u8> = row.get(4)?;

            let vector = match blob_to_vector(&blob) {
                Ok(v) => v,
                // Skip corrupt rows rather than failing the whole query.
                Err(_) => return Ok(()),
            };
            let page = match page {
                Some(p) if p > 0 => p as u32,
                _ => return Ok(()),
            };

            scored.push(RetrievedChunk {
                chunk_id: id,
                score: cosine_similarity(&query_vector, &vector),
                content,
                source,
                page,
            });
            Ok(())
        };

        if let Some(source) = source_filter {
            let mut stmt = conn.prepare(
                "SELECT id, source, page, content, embedding FROM chunks WHERE source = ?1",
            )?;
            let mut rows = stmt.query(params![source])?;
            while let Some(row) = rows.next()? {
                collect(row)?;
            }
        } else {
            let mut stmt =
                conn.prepare("SELECT id, source, page, content, embedding FROM chunks")?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                collect(row)?;
            }
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn list_sources(&self) -> Result<BTreeMap<String, u64>, VectorStoreError> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare("SELECT source, page FROM chunks")?;
        let mut rows = stmt.query([])?;

        let mut pages_by_source: BTreeMap<String, BTreeSet<i64>> = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let source: String = row.get(0)?;
            // Missing or invalid page metadata never fails the listing.
            let page: Option<i64> = match row.get(1) {
                Ok(p) => p,
                Err(_) => continue,
            };
            let Some(page) = page else { continue };
            if page <= 0 {
                continue;
            }
            pages_by_source.entry(source).or_default().insert(page);
        }

        Ok(pages_by_source
            .into_iter()
            .map(|(source, pages)| (source, pages.len() as u64))
            .collect())
    }

    async fn count(&self) -> Result<u64, VectorStoreError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
