//! # Context Retriever
//!
//! Finds the schema chunks most similar to a question.

use crate::{
    errors::{RagError, Upstream},
    providers::{ai::Embedder, db::storage::VectorStore},
    types::ScoredChunk,
};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ContextRetriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    collection: String,
}

impl ContextRetriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Returns the texts of the `k` closest chunks, newline-joined, closest first.
    ///
    /// An absent or empty collection yields an empty string.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<String, RagError> {
        let chunks = self.retrieve_chunks(question, k).await?;
        Ok(chunks
            .into_iter()
            .map(|c| c.document)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Like [`retrieve`](Self::retrieve) but keeps ids, sources and distances.
    pub async fn retrieve_chunks(
        &self,
        question: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, RagError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let info = self
            .store
            .get_collection(&self.collection)
            .await
            .map_err(|e| e.into_upstream(Upstream::VectorIndex))?;
        let Some(info) = info else {
            debug!(collection = %self.collection, "Collection does not exist; no context");
            return Ok(Vec::new());
        };
        if info.embedding_model != self.embedder.model() {
            return Err(RagError::EmbeddingModelMismatch {
                collection: info.name,
                indexed: info.embedding_model,
                configured: self.embedder.model().to_string(),
            });
        }
        let stored = self
            .store
            .count(&self.collection)
            .await
            .map_err(|e| e.into_upstream(Upstream::VectorIndex))?;
        if stored == 0 {
            debug!(collection = %self.collection, "Collection is empty; no context");
            return Ok(Vec::new());
        }

        let embedding = self
            .embedder
            .embed(question)
            .await
            .map_err(|e| e.into_upstream(Upstream::Embedding))?;
        let chunks = self
            .store
            .query(&self.collection, &embedding, k)
            .await
            .map_err(|e| e.into_upstream(Upstream::VectorIndex))?;

        for chunk in &chunks {
            debug!(id = %chunk.id, distance = chunk.distance, "Retrieved chunk");
        }
        Ok(chunks)
    }
}
