use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bounded slice of the DDL source, the unit of embedding and storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlChunk {
    pub id: String,
    pub text: String,
    pub source_path: String,
}

/// Metadata persisted next to every indexed chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub source: String,
}

/// A single row of the vector index.
#[derive(Debug, Clone)]
pub struct VectorEntry {
    pub id: String,
    pub document: String,
    pub embedding: Vec<f32>,
    pub metadata: EntryMetadata,
}

impl VectorEntry {
    pub fn from_chunk(chunk: DdlChunk, embedding: Vec<f32>) -> Self {
        Self {
            id: chunk.id,
            document: chunk.text,
            embedding,
            metadata: EntryMetadata {
                source: chunk.source_path,
            },
        }
    }
}

/// A document returned by a nearest-neighbour query, closest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub id: String,
    pub document: String,
    pub source: String,
    /// Cosine distance to the query embedding (0.0 means identical direction).
    pub distance: f64,
}

/// The descriptor stored when a collection is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    pub name: String,
    pub embedding_model: String,
    pub created_at: DateTime<Utc>,
}

/// The body of a `POST /query` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

/// The outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub sql: String,
    /// The retrieved chunk texts, newline-joined in ranking order.
    pub ddl_context: String,
}
