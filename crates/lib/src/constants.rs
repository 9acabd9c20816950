//! # Shared Constants
//!
//! Defaults shared by the server, the indexing command and the library itself.

/// The logical dataset name of the schema collection.
pub const DEFAULT_COLLECTION: &str = "ddl";

/// The default location of the DDL source document.
pub const DEFAULT_DDL_FILE: &str = "schema/ddl.sql";

/// The default path for the vector index database.
pub const DEFAULT_DB_FILE: &str = "db/sqlrag.db";

/// Maximum chunk length, in characters, produced by the DDL splitter.
pub const DEFAULT_CHUNK_SIZE: usize = 800;

/// Number of schema chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 4;

/// Environment variable that overrides the system instruction file.
pub const SYSTEM_PROMPT_ENV: &str = "RAG_SYSTEM_PROMPT";

/// The system instruction file shipped with the crate.
pub const DEFAULT_SYSTEM_PROMPT_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/system_mysql.txt");

pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_GENERATION_MODEL: &str = "llama3:8b";
pub const DEFAULT_OLLAMA_EMBEDDINGS_URL: &str = "http://localhost:11434/api/embeddings";
pub const DEFAULT_OLLAMA_GENERATE_URL: &str = "http://localhost:11434/api/generate";
