use crate::{
    errors::RagError,
    providers::db::storage::VectorStore,
    types::{CollectionInfo, EntryMetadata, ScoredChunk, VectorEntry},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    fmt::{self, Debug},
    path::Path,
};
use tracing::{debug, info, warn};
use turso::{params, Connection, Database, Value as TursoValue};

mod sql;

/// A vector store backed by a local SQLite database using Turso.
///
/// This provider holds a `Database` instance. When cloned, it shares the same
/// underlying database, so an in-memory store can be handed to several components.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl SqliteProvider {
    /// Opens (or creates) the store at `db_path` and ensures its tables exist.
    ///
    /// Use ":memory:" for an isolated in-memory database. For file paths, missing
    /// parent directories are created.
    pub async fn new(db_path: &str) -> Result<Self, RagError> {
        if db_path != ":memory:" {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| RagError::StorageConnection(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| RagError::StorageConnection(e.to_string()))?;
        // Use `query` for PRAGMA statements that return a value to avoid "unexpected row" errors.
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| RagError::StorageConnection(e.to_string()))?;

        let provider = Self { db };
        provider.initialize_schema().await?;
        info!(path = %db_path, "Vector store ready");
        Ok(provider)
    }

    /// Ensures that the collection and entry tables exist. Idempotent.
    pub async fn initialize_schema(&self) -> Result<(), RagError> {
        let conn = self.connect()?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ())
                .await
                .map_err(|e| RagError::StorageOperationFailed(e.to_string()))?;
        }
        Ok(())
    }

    fn connect(&self) -> Result<Connection, RagError> {
        self.db
            .connect()
            .map_err(|e| RagError::StorageConnection(e.to_string()))
    }

    async fn insert_entries(
        conn: &Connection,
        collection: &str,
        entries: &[VectorEntry],
    ) -> Result<(), RagError> {
        for entry in entries {
            let metadata = serde_json::to_string(&entry.metadata)?;
            conn.execute(
                sql::INSERT_ENTRY,
                params![
                    collection.to_string(),
                    entry.id.clone(),
                    entry.document.clone(),
                    metadata,
                    TursoValue::Blob(embedding_to_blob(&entry.embedding))
                ],
            )
            .await?;
        }
        Ok(())
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

/// Encodes a vector as the little-endian f32 blob `vector_distance_cos` reads.
fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Formats a query vector as an inline `vector32('[...]')` literal.
fn vector_literal(embedding: &[f32]) -> Result<String, RagError> {
    if embedding.is_empty() {
        return Err(RagError::StorageOperationFailed(
            "query embedding is empty".to_string(),
        ));
    }
    if embedding.iter().any(|f| !f.is_finite()) {
        return Err(RagError::StorageOperationFailed(
            "query embedding contains non-finite values".to_string(),
        ));
    }
    Ok(format!(
        "vector32('[{}]')",
        embedding
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    ))
}

fn text_value(value: TursoValue, column: &str) -> Result<String, RagError> {
    match value {
        TursoValue::Text(s) => Ok(s),
        other => Err(RagError::StorageOperationFailed(format!(
            "expected text in column '{column}', found {other:?}"
        ))),
    }
}

fn parse_created_at(raw: &str) -> Result<DateTime<Utc>, RagError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RagError::StorageOperationFailed(format!("invalid created_at '{raw}': {e}")))
}

#[async_trait]
impl VectorStore for SqliteProvider {
    async fn create_collection(
        &self,
        name: &str,
        embedding_model: &str,
    ) -> Result<CollectionInfo, RagError> {
        if self.get_collection(name).await?.is_some() {
            return Err(RagError::CollectionConflict(name.to_string()));
        }
        let created_at = Utc::now();
        let conn = self.connect()?;
        conn.execute(
            sql::INSERT_COLLECTION,
            params![
                name.to_string(),
                embedding_model.to_string(),
                created_at.to_rfc3339()
            ],
        )
        .await
        .map_err(|e| {
            // A concurrent creator may have won the race between the check and the insert.
            if e.to_string().to_lowercase().contains("unique") {
                RagError::CollectionConflict(name.to_string())
            } else {
                RagError::StorageOperationFailed(e.to_string())
            }
        })?;
        info!(collection = %name, model = %embedding_model, "Created collection");
        Ok(CollectionInfo {
            name: name.to_string(),
            embedding_model: embedding_model.to_string(),
            created_at,
        })
    }

    async fn delete_collection(&self, name: &str) -> Result<bool, RagError> {
        let existed = self.get_collection(name).await?.is_some();
        let conn = self.connect()?;
        conn.execute("BEGIN TRANSACTION", ()).await?;
        let result = async {
            conn.execute(sql::DELETE_COLLECTION_ENTRIES, params![name.to_string()])
                .await?;
            conn.execute(sql::DELETE_COLLECTION, params![name.to_string()])
                .await?;
            Ok::<(), turso::Error>(())
        }
        .await;
        match result {
            Ok(()) => {
                conn.execute("COMMIT", ()).await?;
                if existed {
                    info!(collection = %name, "Deleted collection");
                }
                Ok(existed)
            }
            Err(e) => {
                conn.execute("ROLLBACK", ()).await.ok();
                Err(e.into())
            }
        }
    }

    async fn get_collection(&self, name: &str) -> Result<Option<CollectionInfo>, RagError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(sql::SELECT_COLLECTION, params![name.to_string()])
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let name = text_value(row.get_value(0)?, "name")?;
        let embedding_model = text_value(row.get_value(1)?, "embedding_model")?;
        let created_at = parse_created_at(&text_value(row.get_value(2)?, "created_at")?)?;
        Ok(Some(CollectionInfo {
            name,
            embedding_model,
            created_at,
        }))
    }

    async fn add(&self, collection: &str, entries: &[VectorEntry]) -> Result<(), RagError> {
        if self.get_collection(collection).await?.is_none() {
            return Err(RagError::StorageOperationFailed(format!(
                "collection '{collection}' does not exist"
            )));
        }
        if entries.is_empty() {
            return Ok(());
        }

        let conn = self.connect()?;
        conn.execute("BEGIN TRANSACTION", ()).await?;
        match Self::insert_entries(&conn, collection, entries).await {
            Ok(()) => {
                conn.execute("COMMIT", ()).await?;
                debug!(collection = %collection, count = entries.len(), "Inserted vector entries");
                Ok(())
            }
            Err(e) => {
                warn!(collection = %collection, error = %e, "Rolling back vector insert");
                conn.execute("ROLLBACK", ()).await.ok();
                Err(e)
            }
        }
    }

    async fn count(&self, collection: &str) -> Result<usize, RagError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(sql::COUNT_ENTRIES, params![collection.to_string()])
            .await?;
        match rows.next().await? {
            Some(row) => match row.get_value(0)? {
                TursoValue::Integer(n) => Ok(usize::try_from(n).unwrap_or(0)),
                other => Err(RagError::StorageOperationFailed(format!(
                    "unexpected count value {other:?}"
                ))),
            },
            None => Ok(0),
        }
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, RagError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let query_sql = sql::nearest_entries(&vector_literal(embedding)?, limit);
        debug!(collection = %collection, limit, "Executing vector search SQL");

        let conn = self.connect()?;
        let mut rows = conn
            .query(&query_sql, params![collection.to_string()])
            .await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            let id = text_value(row.get_value(0)?, "id")?;
            let document = text_value(row.get_value(1)?, "document")?;
            let metadata: EntryMetadata =
                serde_json::from_str(&text_value(row.get_value(2)?, "metadata")?)?;
            let distance = match row.get_value(3)? {
                TursoValue::Real(d) => d,
                TursoValue::Integer(i) => i as f64,
                other => {
                    return Err(RagError::StorageOperationFailed(format!(
                        "unexpected distance value {other:?}"
                    )))
                }
            };
            results.push(ScoredChunk {
                id,
                document,
                source: metadata.source,
                distance,
            });
        }
        Ok(results)
    }
}
