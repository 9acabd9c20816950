use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The external services a request depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Embedding,
    Generation,
    VectorIndex,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Upstream::Embedding => "Embedding service",
            Upstream::Generation => "Generation service",
            Upstream::VectorIndex => "Vector index",
        };
        f.write_str(name)
    }
}

/// Custom error types for the application.
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("DDL source file not found: {}", .0.display())]
    DataSourceMissing(PathBuf),
    #[error("Collection '{0}' already exists")]
    CollectionConflict(String),
    #[error("{service} is unavailable: {message}")]
    UpstreamUnavailable { service: Upstream, message: String },
    #[error("Model output is not a recognized SQL statement: {0}")]
    MalformedGeneration(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Collection '{collection}' was indexed with embedding model '{indexed}', but '{configured}' is configured")]
    EmbeddingModelMismatch {
        collection: String,
        indexed: String,
        configured: String,
    },
    #[error("Storage connection error: {0}")]
    StorageConnection(String),
    #[error("Storage operation failed: {0}")]
    StorageOperationFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File watch error: {0}")]
    Watch(#[from] notify::Error),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

impl RagError {
    pub fn upstream(service: Upstream, message: impl Into<String>) -> Self {
        RagError::UpstreamUnavailable {
            service,
            message: message.into(),
        }
    }

    /// Re-labels a failure of `service` as `UpstreamUnavailable`.
    ///
    /// Errors that already describe an upstream outage, or that are caller mistakes
    /// such as a model mismatch, are returned unchanged.
    pub fn into_upstream(self, service: Upstream) -> Self {
        match self {
            err @ (RagError::UpstreamUnavailable { .. } | RagError::EmbeddingModelMismatch { .. }) => err,
            other => RagError::upstream(service, other.to_string()),
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, RagError::UpstreamUnavailable { .. })
    }
}

impl From<turso::Error> for RagError {
    fn from(err: turso::Error) -> Self {
        RagError::StorageOperationFailed(err.to_string())
    }
}
