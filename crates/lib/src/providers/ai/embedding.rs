//! # Embeddings Provider
//!
//! This module maps text to vectors by calling an external embeddings API. Two wire
//! formats are supported: Ollama's `/api/embeddings` and the OpenAI-compatible
//! `/v1/embeddings`.

use crate::errors::{RagError, Upstream};
use async_trait::async_trait;
use dyn_clone::DynClone;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::str::FromStr;
use tracing::debug;

/// A trait for services that turn text into a fixed-dimension vector.
#[async_trait]
pub trait Embedder: Send + Sync + Debug + DynClone {
    /// The identifier of the model producing the vectors.
    ///
    /// It is recorded on collections at index time and checked at query time.
    fn model(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError>;
}

dyn_clone::clone_trait_object!(Embedder);

/// The wire format spoken by an embeddings endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingApi {
    #[default]
    Ollama,
    OpenAi,
}

impl FromStr for EmbeddingApi {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ollama" => Ok(EmbeddingApi::Ollama),
            "openai" => Ok(EmbeddingApi::OpenAi),
            other => Err(RagError::Configuration(format!(
                "Unknown embedding provider '{other}'. Expected 'ollama' or 'openai'."
            ))),
        }
    }
}

// --- Ollama request and response structures ---

#[derive(Serialize, Debug)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize, Debug)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize, Debug)]
struct OpenAIEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
}

/// An `Embedder` backed by an HTTP embeddings endpoint.
#[derive(Clone, Debug)]
pub struct HttpEmbedder {
    client: ReqwestClient,
    api: EmbeddingApi,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpEmbedder {
    pub fn new(
        api: EmbeddingApi,
        api_url: String,
        model: String,
        api_key: Option<String>,
    ) -> Result<Self, RagError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(RagError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api,
            api_url,
            model,
            api_key,
        })
    }

    fn unavailable(message: impl Into<String>) -> RagError {
        RagError::upstream(Upstream::Embedding, message)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let mut request_builder = self.client.post(&self.api_url);

        // --- 1. Construct the request body for the configured wire format ---
        request_builder = match self.api {
            EmbeddingApi::Ollama => {
                let request_body = OllamaEmbeddingRequest {
                    model: &self.model,
                    prompt: text,
                };
                debug!(payload = ?request_body, "--> Sending request to Ollama Embeddings API");
                request_builder.json(&request_body)
            }
            EmbeddingApi::OpenAi => {
                let request_body = OpenAIEmbeddingRequest {
                    model: &self.model,
                    input: text,
                };
                debug!(payload = ?request_body, "--> Sending request to OpenAI-compatible Embeddings API");
                request_builder.json(&request_body)
            }
        };
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        // --- 2. Send the request and handle the response ---
        let response = request_builder
            .send()
            .await
            .map_err(|e| Self::unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::unavailable(format!("HTTP {status}: {error_text}")));
        }

        let embedding = match self.api {
            EmbeddingApi::Ollama => {
                let body: OllamaEmbeddingResponse = response
                    .json()
                    .await
                    .map_err(|e| Self::unavailable(e.to_string()))?;
                body.embedding
            }
            EmbeddingApi::OpenAi => {
                let body: OpenAIEmbeddingResponse = response
                    .json()
                    .await
                    .map_err(|e| Self::unavailable(e.to_string()))?;
                body.data
                    .into_iter()
                    .next()
                    .map(|d| d.embedding)
                    .ok_or_else(|| Self::unavailable("API returned no embeddings"))?
            }
        };

        if embedding.is_empty() {
            return Err(Self::unavailable("API returned an empty embedding"));
        }
        Ok(embedding)
    }
}
