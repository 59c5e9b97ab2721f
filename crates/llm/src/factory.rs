//! LLM provider factory.
//!
//! Resolves a provider name to a concrete client implementation.

use std::sync::Arc;

use thermo_core::{AppError, AppResult};

use crate::client::LlmClient;
use crate::providers::OllamaClient;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "openai", "claude")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
///
/// # Errors
/// Returns an error if the provider is unknown or its required secrets
/// are missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let client = match endpoint {
                Some(url) => OllamaClient::with_base_url(url),
                None => OllamaClient::new(),
            };
            Ok(Arc::new(client))
        }
        "openai" => {
            if api_key.is_none() {
                return Err(AppError::Llm(
                    "OpenAI provider requires an API key".to_string(),
                ));
            }
            Err(AppError::Llm(
                "OpenAI provider not yet implemented".to_string(),
            ))
        }
        "claude" | "anthropic" => {
            if api_key.is_none() {
                return Err(AppError::Llm(
                    "Claude provider requires an API key".to_string(),
                ));
            }
            Err(AppError::Llm(
                "Claude provider not yet implemented".to_string(),
            ))
        }
        _ => Err(AppError::Llm(format!("Unknown provider: {}", provider))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        assert!(create_client("ollama", None, None).is_ok());
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        assert!(create_client("ollama", Some("http://localhost:8080"), None).is_ok());
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", None, None) {
            Err(err) => assert!(err.to_string().contains("requires an API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("mystery", None, None) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
