//! # Natural Language to SQL over Schema Retrieval
//!
//! This crate turns natural-language questions into SQL statements. It indexes a DDL
//! document into a vector store, retrieves the schema fragments relevant to each
//! question, assembles a grounded prompt around live-reloadable system instructions,
//! invokes a language model and cleans its output into a single SQL statement.
//!
//! The pieces can be used on their own (`DdlIndexer`, `ContextRetriever`,
//! `PromptManager`, the `sql` helpers) or composed through `QueryPipeline`.

pub mod chunking;
pub mod constants;
pub mod errors;
pub mod indexer;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod retriever;
pub mod sql;
pub mod types;

pub use chunking::DdlSplitter;
pub use errors::{RagError, Upstream};
pub use indexer::{DdlIndexer, IndexOptions};
pub use pipeline::{PipelineOptions, QueryPipeline};
pub use prompts::{manager::PromptManager, manager::WatchMode, template::PromptTemplate};
pub use retriever::ContextRetriever;
pub use types::{CollectionInfo, DdlChunk, GenerationResult, QueryRequest, ScoredChunk, VectorEntry};
