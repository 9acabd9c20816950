//! # SQLite Vector Store Tests
//!
//! Exercises the collection lifecycle and nearest-neighbour ordering of the turso-backed
//! store with hand-made vectors, independent of any embedding model.

mod common;

use anyhow::Result;
use sqlrag::providers::db::{sqlite::SqliteProvider, storage::VectorStore};
use sqlrag::types::{EntryMetadata, VectorEntry};
use sqlrag::RagError;

fn entry(id: &str, document: &str, embedding: Vec<f32>) -> VectorEntry {
    VectorEntry {
        id: id.to_string(),
        document: document.to_string(),
        embedding,
        metadata: EntryMetadata {
            source: "schema/ddl.sql".to_string(),
        },
    }
}

async fn store_with_three_entries() -> Result<SqliteProvider> {
    let store = SqliteProvider::new(":memory:").await?;
    store.create_collection("ddl", "test-model").await?;
    store
        .add(
            "ddl",
            &[
                entry("ddl_0", "CREATE TABLE users (id INT);", vec![1.0, 0.0, 0.0]),
                entry("ddl_1", "CREATE TABLE orders (id INT);", vec![0.0, 1.0, 0.0]),
                entry("ddl_2", "CREATE TABLE mixed (id INT);", vec![0.7, 0.7, 0.0]),
            ],
        )
        .await?;
    Ok(store)
}

#[tokio::test]
async fn test_create_and_get_collection() -> Result<()> {
    common::setup_tracing();
    let store = SqliteProvider::new(":memory:").await?;

    assert!(store.get_collection("ddl").await?.is_none());
    let created = store.create_collection("ddl", "nomic-embed-text").await?;
    let fetched = store.get_collection("ddl").await?.expect("collection exists");

    assert_eq!(fetched.name, "ddl");
    assert_eq!(fetched.embedding_model, "nomic-embed-text");
    assert_eq!(fetched.created_at.timestamp(), created.created_at.timestamp());
    Ok(())
}

#[tokio::test]
async fn test_creating_existing_collection_conflicts() -> Result<()> {
    let store = SqliteProvider::new(":memory:").await?;
    store.create_collection("ddl", "m").await?;

    let err = store.create_collection("ddl", "m").await.unwrap_err();
    assert!(matches!(err, RagError::CollectionConflict(ref name) if name == "ddl"));
    Ok(())
}

#[tokio::test]
async fn test_query_orders_by_cosine_distance() -> Result<()> {
    let store = store_with_three_entries().await?;
    assert_eq!(store.count("ddl").await?, 3);

    let results = store.query("ddl", &[1.0, 0.0, 0.0], 3).await?;
    let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["ddl_0", "ddl_2", "ddl_1"]);
    assert!(results[0].distance.abs() < 1e-6);
    assert!(results[0].distance <= results[1].distance);
    assert!(results[1].distance <= results[2].distance);
    assert_eq!(results[0].document, "CREATE TABLE users (id INT);");
    assert_eq!(results[0].source, "schema/ddl.sql");
    Ok(())
}

#[tokio::test]
async fn test_query_respects_limit() -> Result<()> {
    let store = store_with_three_entries().await?;

    let results = store.query("ddl", &[0.0, 1.0, 0.0], 1).await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "ddl_1");

    assert!(store.query("ddl", &[0.0, 1.0, 0.0], 0).await?.is_empty());
    assert_eq!(store.query("ddl", &[0.0, 1.0, 0.0], 10).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_collections_are_isolated() -> Result<()> {
    let store = store_with_three_entries().await?;
    store.create_collection("other", "test-model").await?;

    assert_eq!(store.count("other").await?, 0);
    assert!(store.query("other", &[1.0, 0.0, 0.0], 4).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_delete_collection_removes_entries() -> Result<()> {
    let store = store_with_three_entries().await?;

    assert!(store.delete_collection("ddl").await?);
    assert!(store.get_collection("ddl").await?.is_none());
    assert_eq!(store.count("ddl").await?, 0);
    assert!(!store.delete_collection("ddl").await?);

    // The name is free again.
    store.create_collection("ddl", "test-model").await?;
    Ok(())
}

#[tokio::test]
async fn test_add_requires_existing_collection() -> Result<()> {
    let store = SqliteProvider::new(":memory:").await?;
    let err = store
        .add("missing", &[entry("ddl_0", "x", vec![1.0])])
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::StorageOperationFailed(_)));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_ids_roll_back_the_batch() -> Result<()> {
    let store = SqliteProvider::new(":memory:").await?;
    store.create_collection("ddl", "m").await?;

    let result = store
        .add(
            "ddl",
            &[
                entry("ddl_0", "a", vec![1.0, 0.0]),
                entry("ddl_0", "b", vec![0.0, 1.0]),
            ],
        )
        .await;
    assert!(result.is_err());
    assert_eq!(store.count("ddl").await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_file_database_persists_collections() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("nested").join("index.db");
    let db_url = db_path.to_string_lossy().to_string();

    {
        let store = SqliteProvider::new(&db_url).await?;
        store.create_collection("ddl", "m").await?;
        store
            .add("ddl", &[entry("ddl_0", "CREATE TABLE t (x INT);", vec![1.0, 0.0])])
            .await?;
    }

    let reopened = SqliteProvider::new(&db_url).await?;
    assert!(reopened.get_collection("ddl").await?.is_some());
    assert_eq!(reopened.count("ddl").await?, 1);
    Ok(())
}
