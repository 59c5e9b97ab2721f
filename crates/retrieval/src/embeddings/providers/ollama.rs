//! Ollama embedding provider.
//!
//! Calls the local Ollama `/api/embeddings` endpoint with models like
//! nomic-embed-text. Requests are retried a few times with backoff
//! because a local daemon under load answers 503 transiently.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::embeddings::provider::EmbeddingProvider;
use thermo_core::{AppError, AppResult};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBEDDINGS_ENDPOINT: &str = "/api/embeddings";

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 100;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Request payload for the Ollama embeddings API.
#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    prompt: String,
}

/// Response from the Ollama embeddings API.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Ollama embedding provider using the local API.
#[derive(Debug)]
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaProvider {
    /// Create a provider against `endpoint` (or the default local URL).
    pub fn new(endpoint: Option<&str>, model: &str, dimensions: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: endpoint.unwrap_or(DEFAULT_OLLAMA_URL).to_string(),
            model: model.to_string(),
            dimensions,
        }
    }

    async fn embed_with_retry(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDINGS_ENDPOINT);
        let request = EmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let mut backoff = Duration::from_millis(INITIAL_BACKOFF_MS);
        let mut last_error = String::new();

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            let response = match self.client.post(&url).json(&request).send().await {
                Ok(response) => response,
                Err(e) => {
                    last_error = format!("request failed: {}", e);
                    tracing::warn!("Ollama embedding attempt {} failed: {}", attempt + 1, e);
                    continue;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                last_error = format!(
                    "Ollama API error ({}): {}",
                    status,
                    response.text().await.unwrap_or_default()
                );
                // Client errors will not improve on retry
                if status.is_client_error() {
                    break;
                }
                continue;
            }

            let parsed: EmbeddingResponse = response
                .json()
                .await
                .map_err(|e| AppError::Embedding(format!("malformed embedding response: {}", e)))?;

            if parsed.embedding.len() != self.dimensions {
                return Err(AppError::Embedding(format!(
                    "model '{}' returned {} dimensions, configured for {}",
                    self.model,
                    parsed.embedding.len(),
                    self.dimensions
                )));
            }

            return Ok(parsed.embedding);
        }

        Err(AppError::Embedding(format!(
            "embedding failed after {} attempts: {}",
            MAX_RETRIES, last_error
        )))
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        // The embeddings endpoint takes one prompt per call
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed_with_retry(text).await?);
        }
        Ok(embeddings)
    }
}
