use anyhow::Result;
use async_trait::async_trait;
use sqlrag::errors::{RagError, Upstream};
use sqlrag::providers::ai::{AiProvider, Embedder};
use sqlrag::providers::db::sqlite::SqliteProvider;
use sqlrag::providers::db::storage::VectorStore;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- Test Setup ---

/// A helper struct holding an isolated in-memory vector store for each test.
pub struct TestSetup {
    pub store: SqliteProvider,
}

impl TestSetup {
    /// Creates a new, isolated in-memory database with the vector tables in place.
    pub async fn new() -> Result<Self> {
        let store = SqliteProvider::new(":memory:").await?;
        Ok(Self { store })
    }

    pub fn store(&self) -> Arc<dyn VectorStore> {
        Arc::new(self.store.clone())
    }
}

// --- Mock AI Provider ---

#[derive(Clone, Debug, Default)]
pub struct MockAiProvider {
    responses: Arc<Mutex<HashMap<String, String>>>,
    fallback: Arc<Mutex<Option<String>>>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that answers every prompt with `response`.
    pub fn always(response: &str) -> Self {
        let provider = Self::new();
        *provider.fallback.lock().unwrap() = Some(response.to_string());
        provider
    }

    /// Pre-programs a response for prompts containing `key`.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(key.to_string(), response.to_string());
    }

    /// Delays every answer, for exercising timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Retrieves the recorded prompts for assertion.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        self.calls.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let keyed = {
            let responses = self.responses.lock().unwrap();
            responses
                .iter()
                .find(|(key, _)| prompt.contains(key.as_str()))
                .map(|(_, response)| response.clone())
        };
        if let Some(response) = keyed.or_else(|| self.fallback.lock().unwrap().clone()) {
            return Ok(response);
        }

        Err(RagError::upstream(
            Upstream::Generation,
            format!("MockAiProvider: No response programmed for prompt. Got: '{prompt}'"),
        ))
    }
}

// --- Deterministic Embedders ---

const HASH_DIMENSIONS: usize = 64;

/// A deterministic bag-of-words embedder.
///
/// Each lowercase alphanumeric token is hashed into one of 64 buckets. Dimension 0
/// is a constant bias so no vector is ever all zeros. Texts sharing words end up
/// closer in cosine distance, which is enough to test ranking.
#[derive(Clone, Debug)]
pub struct HashEmbedder {
    model: String,
    calls: Arc<Mutex<Vec<String>>>,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self::with_model("hash-embed")
    }

    pub fn with_model(model: &str) -> Self {
        Self {
            model: model.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The texts embedded so far.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn vectorize(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; HASH_DIMENSIONS];
        vector[0] = 1.0;
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = 1 + (fnv1a(token) as usize % (HASH_DIMENSIONS - 1));
            vector[bucket] += 1.0;
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(0xcbf29ce484222325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x100000001b3)
    })
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(Self::vectorize(text))
    }
}

/// An embedder whose service is always down. Optionally succeeds for the first calls.
#[derive(Clone, Debug)]
pub struct FailingEmbedder {
    model: String,
    succeed_first: usize,
    calls: Arc<Mutex<usize>>,
}

impl FailingEmbedder {
    pub fn new(model: &str) -> Self {
        Self::after(model, 0)
    }

    pub fn after(model: &str, succeed_first: usize) -> Self {
        Self {
            model: model.to_string(),
            succeed_first,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Embedder for FailingEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if call <= self.succeed_first {
            return Ok(HashEmbedder::vectorize(text));
        }
        Err(RagError::upstream(
            Upstream::Embedding,
            "connection refused",
        ))
    }
}
