//! Error types for the Thermo assistant.
//!
//! This module defines a unified error enum that covers all error
//! categories in the application: configuration, I/O, retrieval,
//! embeddings, sandbox execution, and LLM calls.

use thiserror::Error;

/// Unified error type for the Thermo assistant.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic on an error path — errors must be represented and
/// propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Retrieval and indexing errors
    #[error("Index error: {0}")]
    Index(String),

    /// A query was issued against an index that was never built or loaded.
    ///
    /// Recoverable: the caller triggers a build by running the ingest step.
    #[error("no corpus indexed; run `thermo ingest` to build one")]
    IndexNotReady,

    /// Malformed build input or a query vector of the wrong length.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A typed calculation request rejected before any execution.
    #[error("invalid calculation: {0}")]
    Calc(String),

    /// The sandbox interpreter could not be spawned at all.
    ///
    /// A configuration/environment fault, distinct from errors raised by
    /// the snippet itself (those are captured in the run's JSON output).
    #[error("failed to spawn sandbox process: {0}")]
    SandboxSpawn(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
