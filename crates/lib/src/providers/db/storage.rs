use crate::errors::RagError;
use crate::types::{CollectionInfo, ScoredChunk, VectorEntry};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for a persistent, named collection store with nearest-neighbour search.
///
/// Collections are created with the embedding model that populated them so readers
/// can refuse to compare vectors from different models.
#[async_trait]
pub trait VectorStore: Send + Sync + DynClone + Debug {
    /// Creates an empty collection. Fails with `CollectionConflict` if it exists.
    async fn create_collection(
        &self,
        name: &str,
        embedding_model: &str,
    ) -> Result<CollectionInfo, RagError>;

    /// Deletes a collection and all its entries. Returns whether it existed.
    async fn delete_collection(&self, name: &str) -> Result<bool, RagError>;

    async fn get_collection(&self, name: &str) -> Result<Option<CollectionInfo>, RagError>;

    /// Inserts entries into an existing collection.
    async fn add(&self, collection: &str, entries: &[VectorEntry]) -> Result<(), RagError>;

    async fn count(&self, collection: &str) -> Result<usize, RagError>;

    /// Returns up to `limit` entries ordered by ascending cosine distance to `embedding`.
    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, RagError>;
}

dyn_clone::clone_trait_object!(VectorStore);
