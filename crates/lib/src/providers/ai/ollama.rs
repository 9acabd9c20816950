//! # Ollama Generation Provider
//!
//! Talks to Ollama's `/api/generate` endpoint in non-streaming mode.

use crate::{
    errors::{RagError, Upstream},
    providers::ai::AiProvider,
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize, Debug)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize, Debug)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct OllamaGenerateResponse {
    response: String,
}

#[derive(Clone, Debug)]
pub struct OllamaProvider {
    client: ReqwestClient,
    api_url: String,
    model: String,
    temperature: f32,
}

impl OllamaProvider {
    /// Creates a provider for `model` served at `api_url`, sampling at temperature 0.
    pub fn new(api_url: String, model: String) -> Result<Self, RagError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(RagError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            model,
            temperature: 0.0,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl AiProvider for OllamaProvider {
    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        let request_body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };
        debug!(url = %self.api_url, model = %self.model, "--> Sending request to Ollama generate API");

        let response = self
            .client
            .post(&self.api_url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| RagError::upstream(Upstream::Generation, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RagError::upstream(
                Upstream::Generation,
                format!("HTTP {status}: {error_text}"),
            ));
        }

        let body: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| RagError::upstream(Upstream::Generation, e.to_string()))?;
        Ok(body.response)
    }
}
