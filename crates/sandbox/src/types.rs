//! Sandbox run records.

use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Outcome of one sandbox execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    /// stdout parsed as JSON without an "error" key.
    Success { result: serde_json::Value },

    /// The snippet raised and the harness reported the message, or the
    /// snippet violated the one-JSON-line contract.
    RuntimeFailure { message: String },

    /// The child was killed at the deadline. Retryable by the caller;
    /// the sandbox itself never retries.
    TimedOut,
}

impl RunOutcome {
    /// Classify trimmed stdout from a completed (non-timeout) run.
    ///
    /// A non-empty stderr is not consulted — the definitive marker is
    /// whether stdout parses as JSON carrying an "error" key. Empty
    /// stdout means the snippet chose to print nothing and is a success
    /// with a null result.
    pub fn from_stdout(stdout: &str) -> Self {
        if stdout.is_empty() {
            return Self::Success {
                result: serde_json::Value::Null,
            };
        }

        match serde_json::from_str::<serde_json::Value>(stdout) {
            Ok(value) => {
                if let Some(message) = value.get("error").and_then(|m| m.as_str()) {
                    Self::RuntimeFailure {
                        message: message.to_string(),
                    }
                } else {
                    Self::Success { result: value }
                }
            }
            Err(_) => Self::RuntimeFailure {
                message: "snippet produced output that is not valid JSON".to_string(),
            },
        }
    }

    /// Whether the caller may reasonably retry this outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// Ephemeral record of one execution request.
///
/// Exists only for the duration of one call; nothing is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SandboxRun {
    /// Unique id for correlation in logs
    pub id: Uuid,

    /// Captured standard output, trimmed of surrounding whitespace
    pub stdout: String,

    /// Captured standard error, trimmed of surrounding whitespace
    pub stderr: String,

    /// Wall-clock time from spawn to exit or kill
    pub duration: Duration,

    /// Classified outcome
    pub outcome: RunOutcome,
}
