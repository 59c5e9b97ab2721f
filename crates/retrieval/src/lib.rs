//! Corpus retrieval for the Thermo assistant.
//!
//! Provides brute-force exact nearest-neighbor search over embedded text
//! chunks, with a persist/load lifecycle and pluggable embedding
//! providers. Corpus sizes are small (hundreds to low thousands of
//! chunks), so exactness and determinism win over sub-linear scaling.

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use index::VectorIndex;
pub use ingest::{ingest, IngestOptions, IngestStats};
pub use types::{Chunk, IndexStats};
