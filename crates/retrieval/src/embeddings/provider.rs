//! Embedding provider trait and factory.

use std::sync::Arc;

use thermo_core::config::EmbeddingSettings;
use thermo_core::{AppError, AppResult};

/// Trait for embedding providers.
///
/// Both methods are deterministic per model version, so an index built
/// and queried with the same provider ranks consistently.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensionality
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from settings.
pub fn create_provider(settings: &EmbeddingSettings) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if settings.dimensions == 0 {
        return Err(AppError::Embedding(
            "embedding dimensions must be non-zero".to_string(),
        ));
    }

    match settings.provider.as_str() {
        "trigram" => Ok(Arc::new(super::providers::trigram::TrigramProvider::new(
            settings.dimensions,
        ))),

        "ollama" => Ok(Arc::new(super::providers::ollama::OllamaProvider::new(
            settings.endpoint.as_deref(),
            &settings.model,
            settings.dimensions,
        ))),

        other => Err(AppError::Embedding(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            other
        ))),
    }
}
