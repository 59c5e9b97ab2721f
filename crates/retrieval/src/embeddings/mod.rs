//! Embedding providers.
//!
//! The embedding function is an external collaborator: the index only
//! consumes fixed-length vectors and has no opinion about how they are
//! produced. Providers are injected at construction time and shared
//! read-only — there are no process-scoped singletons.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
