//! # Provider Factory
//!
//! Builds the embedding and generation providers from their configuration. The server
//! and the indexing command share this so both sides of the index agree on the
//! embedding model.

use crate::{
    constants::{
        DEFAULT_EMBEDDING_MODEL, DEFAULT_GENERATION_MODEL, DEFAULT_OLLAMA_EMBEDDINGS_URL,
        DEFAULT_OLLAMA_GENERATE_URL,
    },
    errors::RagError,
    providers::ai::{
        local::LocalAiProvider, ollama::OllamaProvider, AiProvider, Embedder, EmbeddingApi,
        HttpEmbedder,
    },
};
use serde::Deserialize;
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationApi {
    Ollama,
    Local,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingProviderConfig {
    pub provider: EmbeddingApi,
    pub api_url: Option<String>,
    pub model_name: String,
    pub api_key: Option<String>,
}

impl Default for EmbeddingProviderConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingApi::Ollama,
            api_url: None,
            model_name: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GenerationProviderConfig {
    pub provider: GenerationApi,
    pub api_url: Option<String>,
    pub model_name: String,
    pub api_key: Option<String>,
    pub temperature: f32,
}

impl Default for GenerationProviderConfig {
    fn default() -> Self {
        Self {
            provider: GenerationApi::Ollama,
            api_url: None,
            model_name: DEFAULT_GENERATION_MODEL.to_string(),
            api_key: None,
            temperature: 0.0,
        }
    }
}

// Keys must not leak into logs.
impl fmt::Debug for EmbeddingProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingProviderConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("model_name", &self.model_name)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Debug for GenerationProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationProviderConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("model_name", &self.model_name)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Creates the embedder described by `config`.
///
/// Ollama falls back to the local default endpoint; the OpenAI-compatible format has
/// no sensible default and requires `api_url`.
pub fn create_embedder(config: &EmbeddingProviderConfig) -> Result<Box<dyn Embedder>, RagError> {
    let api_url = match (&config.provider, &config.api_url) {
        (_, Some(url)) => url.clone(),
        (EmbeddingApi::Ollama, None) => DEFAULT_OLLAMA_EMBEDDINGS_URL.to_string(),
        (EmbeddingApi::OpenAi, None) => {
            return Err(RagError::Configuration(
                "api_url must be set for the 'openai' embedding provider.".to_string(),
            ))
        }
    };
    info!(
        "Configuring {:?} embedder '{}' with URL: {}",
        config.provider, config.model_name, api_url
    );
    Ok(Box::new(HttpEmbedder::new(
        config.provider,
        api_url,
        config.model_name.clone(),
        config.api_key.clone(),
    )?))
}

/// Creates the generation provider described by `config`.
pub fn create_ai_provider(
    config: &GenerationProviderConfig,
) -> Result<Box<dyn AiProvider>, RagError> {
    let provider: Box<dyn AiProvider> = match config.provider {
        GenerationApi::Ollama => {
            let api_url = config
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_GENERATE_URL.to_string());
            info!(
                "Configuring Ollama provider '{}' with URL: {}",
                config.model_name, api_url
            );
            Box::new(
                OllamaProvider::new(api_url, config.model_name.clone())?
                    .with_temperature(config.temperature),
            )
        }
        GenerationApi::Local => {
            let api_url = config.api_url.clone().ok_or_else(|| {
                RagError::Configuration(
                    "api_url must be set for the 'local' generation provider.".to_string(),
                )
            })?;
            info!(
                "Configuring Local AI provider '{}' with URL: {}",
                config.model_name, api_url
            );
            Box::new(
                LocalAiProvider::new(
                    api_url,
                    config.api_key.clone(),
                    Some(config.model_name.clone()),
                )?
                .with_temperature(config.temperature),
            )
        }
    };
    Ok(provider)
}
