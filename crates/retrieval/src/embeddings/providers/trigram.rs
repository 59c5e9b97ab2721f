//! Character-trigram embeddings for offline use.

use crate::embeddings::provider::EmbeddingProvider;
use thermo_core::AppResult;

/// Hash-based trigram embedding provider.
///
/// Not a semantic model: character trigrams and whole words are hashed
/// onto fixed dimensions, producing deterministic, content-dependent
/// vectors. Good enough for tests and offline development; real corpora
/// should use a neural provider.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    /// Create a new trigram provider with the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        for word in lower.split_whitespace().filter(|w| w.len() > 2) {
            let bytes = word.as_bytes();

            for window in bytes.windows(3) {
                let h = window
                    .iter()
                    .fold(0u64, |acc, &b| acc.wrapping_mul(37).wrapping_add(b as u64));
                embedding[(h as usize) % self.dimensions] += 1.0;
            }

            // Whole-word signal on top of the trigrams
            let h = bytes
                .iter()
                .fold(0u64, |acc, &b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(h as usize) % self.dimensions] += 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embeddings_are_deterministic() {
        let provider = TrigramProvider::new(128);
        let a = provider.embed("convection heat transfer").await.unwrap();
        let b = provider.embed("convection heat transfer").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_different_texts_differ() {
        let provider = TrigramProvider::new(128);
        let a = provider.embed("convection heat transfer").await.unwrap();
        let b = provider.embed("entropy of an ideal gas").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_embeddings_are_unit_length() {
        let provider = TrigramProvider::new(64);
        let v = provider.embed("thermal conductivity").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_stopword_only_text_is_zero_vector() {
        let provider = TrigramProvider::new(64);
        // Words of length <= 2 contribute nothing
        let v = provider.embed("a an of to").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_batch_matches_single() {
        let provider = TrigramProvider::new(96);
        let batch = provider
            .embed_batch(&["one text".to_string(), "another text".to_string()])
            .await
            .unwrap();
        let single = provider.embed("one text").await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], single);
    }
}
