//! # DDL Indexer
//!
//! Reads a DDL document, splits it into chunks, embeds every chunk and stores the
//! result as a fresh collection in the vector index.

use crate::{
    chunking::DdlSplitter,
    errors::{RagError, Upstream},
    providers::{ai::Embedder, db::storage::VectorStore},
    types::VectorEntry,
};
use std::{path::Path, sync::Arc};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptions {
    /// Delete an existing collection of the same name before indexing.
    pub recreate: bool,
}

#[derive(Debug, Clone)]
pub struct DdlIndexer {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    splitter: DdlSplitter,
}

impl DdlIndexer {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            splitter: DdlSplitter::default(),
        }
    }

    pub fn with_splitter(mut self, splitter: DdlSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Indexes `ddl_file` into a new collection and returns the number of chunks.
    ///
    /// Fails with `CollectionConflict` if the collection already exists.
    pub async fn index(&self, ddl_file: &Path, collection: &str) -> Result<usize, RagError> {
        self.index_with_options(ddl_file, collection, IndexOptions::default())
            .await
    }

    pub async fn index_with_options(
        &self,
        ddl_file: &Path,
        collection: &str,
        options: IndexOptions,
    ) -> Result<usize, RagError> {
        // --- 1. Read and split the source before touching the index ---
        if !ddl_file.exists() {
            return Err(RagError::DataSourceMissing(ddl_file.to_path_buf()));
        }
        let ddl_text = tokio::fs::read_to_string(ddl_file).await?;
        let source = ddl_file.display().to_string();
        let chunks = self.splitter.chunk(&ddl_text, &source);
        info!(
            file = %source,
            chunks = chunks.len(),
            chunk_size = self.splitter.chunk_size(),
            "Split DDL document"
        );

        // --- 2. Create the collection ---
        if options.recreate && self.store.delete_collection(collection).await? {
            info!(collection = %collection, "Removed existing collection before re-indexing");
        }
        self.store
            .create_collection(collection, self.embedder.model())
            .await?;

        // --- 3. Embed and persist, removing the partial collection on failure ---
        let count = chunks.len();
        let result = async {
            let mut entries = Vec::with_capacity(count);
            for chunk in chunks {
                debug!(id = %chunk.id, len = chunk.text.len(), "Embedding chunk");
                let embedding = self
                    .embedder
                    .embed(&chunk.text)
                    .await
                    .map_err(|e| e.into_upstream(Upstream::Embedding))?;
                entries.push(VectorEntry::from_chunk(chunk, embedding));
            }
            self.store.add(collection, &entries).await
        }
        .await;

        if let Err(e) = result {
            warn!(collection = %collection, error = %e, "Indexing failed; removing partial collection");
            if let Err(cleanup) = self.store.delete_collection(collection).await {
                warn!(collection = %collection, error = %cleanup, "Failed to remove partial collection");
            }
            return Err(e);
        }

        info!("Indexed {count} chunks");
        Ok(count)
    }
}
