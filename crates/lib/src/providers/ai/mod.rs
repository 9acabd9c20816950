pub mod embedding;
pub mod local;
pub mod ollama;

use crate::errors::RagError;
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use embedding::{Embedder, EmbeddingApi, HttpEmbedder};
use std::fmt::Debug;

/// A trait for interacting with a text generation model.
///
/// Implementations receive a fully assembled prompt and return the raw model output.
/// Cleaning that output into SQL is left to the caller.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, RagError>;
}

dyn_clone::clone_trait_object!(AiProvider);
