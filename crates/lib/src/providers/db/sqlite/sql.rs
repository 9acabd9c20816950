//! # SQLite Specific SQL Queries
//!
//! This module centralizes the SQL used by the vector store so the provider logic
//! stays free of database-specific syntax.

pub const CREATE_COLLECTIONS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS vector_collections (
        name TEXT PRIMARY KEY,
        embedding_model TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
";

pub const CREATE_ENTRIES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS vector_entries (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        document TEXT NOT NULL,
        metadata TEXT NOT NULL,
        embedding BLOB NOT NULL,
        PRIMARY KEY (collection, id)
    );
";

pub const ALL_TABLE_CREATION_SQL: &[&str] = &[CREATE_COLLECTIONS_TABLE, CREATE_ENTRIES_TABLE];

pub const INSERT_COLLECTION: &str =
    "INSERT INTO vector_collections (name, embedding_model, created_at) VALUES (?, ?, ?)";

pub const SELECT_COLLECTION: &str =
    "SELECT name, embedding_model, created_at FROM vector_collections WHERE name = ?";

pub const DELETE_COLLECTION: &str = "DELETE FROM vector_collections WHERE name = ?";

pub const DELETE_COLLECTION_ENTRIES: &str = "DELETE FROM vector_entries WHERE collection = ?";

pub const INSERT_ENTRY: &str =
    "INSERT INTO vector_entries (collection, id, document, metadata, embedding) VALUES (?, ?, ?, ?, ?)";

pub const COUNT_ENTRIES: &str = "SELECT COUNT(*) FROM vector_entries WHERE collection = ?";

/// Returns the nearest-neighbour query for a collection.
///
/// The query vector is inlined as a `vector32` literal and the single parameter
/// (`?1`) is the collection name. Ties are broken by id so results are stable.
pub fn nearest_entries(vector_literal: &str, limit: usize) -> String {
    format!(
        "
        SELECT id, document, metadata, vector_distance_cos(embedding, {vector_literal}) AS distance
        FROM vector_entries
        WHERE collection = ?1
        ORDER BY distance ASC, id ASC
        LIMIT {limit};
    "
    )
}
