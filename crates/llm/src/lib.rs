//! Reasoning backend integration for the Thermo assistant.
//!
//! Provides a provider-agnostic abstraction over Large Language Models.
//! The retrieval core has no dependency on which backend is used — it
//! hands over free-text context and this crate does the rest.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - Future: OpenAI, Anthropic, etc.

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
pub use factory::create_client;
pub use providers::OllamaClient;
