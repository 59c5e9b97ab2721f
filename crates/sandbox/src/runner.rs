//! Child-process execution with a wall-clock timeout.

use std::io::Write;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use uuid::Uuid;

use thermo_core::{AppError, AppResult};

use crate::harness::wrap_snippet;
use crate::types::{RunOutcome, SandboxRun};

/// Executes snippets in a fresh interpreter process per call.
///
/// Each run owns its own temporary source file and child process, so
/// calls may execute fully in parallel without shared mutable state.
#[derive(Debug, Clone)]
pub struct Sandbox {
    python_bin: String,
    timeout: Duration,
}

impl Sandbox {
    /// Create a sandbox using `python_bin` with the given per-run timeout.
    pub fn new(python_bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            python_bin: python_bin.into(),
            timeout,
        }
    }

    /// Run a snippet to completion or timeout.
    ///
    /// Timeout is not an error: the child is killed and reaped, and the
    /// returned record carries whatever output existed at the kill
    /// point (typically none). Only a failure to spawn the interpreter
    /// is fatal to the call.
    pub async fn run(&self, code: &str) -> AppResult<SandboxRun> {
        let id = Uuid::new_v4();
        let wrapped = wrap_snippet(code);

        // Unique source artifact; the guard removes it on every exit
        // path when it drops.
        let mut source = tempfile::Builder::new()
            .prefix("thermo-snippet-")
            .suffix(".py")
            .tempfile()?;
        source.write_all(wrapped.as_bytes())?;
        source.flush()?;

        tracing::debug!("Sandbox run {} using {:?}", id, source.path());

        let started = Instant::now();

        let mut child = Command::new(&self.python_bin)
            .arg(source.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::SandboxSpawn(format!("{}: {}", self.python_bin, e)))?;

        let mut stdout_pipe = child
            .stdout
            .take()
            .ok_or_else(|| AppError::SandboxSpawn("child stdout was not captured".to_string()))?;
        let mut stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| AppError::SandboxSpawn("child stderr was not captured".to_string()))?;

        // Drain both pipes concurrently so a chatty child cannot fill a
        // pipe buffer and deadlock against wait().
        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stdout_pipe.read_to_end(&mut buf).await;
            buf
        });
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr_pipe.read_to_end(&mut buf).await;
            buf
        });

        let timed_out = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => {
                let status = status?;
                tracing::debug!("Sandbox run {} exited with {}", id, status);
                false
            }
            Err(_) => {
                tracing::warn!(
                    "Sandbox run {} exceeded {:?}; killing child",
                    id,
                    self.timeout
                );
                // kill() waits for the child, so nothing is left running
                // or unreaped after this returns.
                child.kill().await?;
                true
            }
        };

        // The pipes are closed once the child is gone, so both drains
        // terminate promptly with whatever partial output existed.
        let stdout = String::from_utf8_lossy(&stdout_task.await.unwrap_or_default())
            .trim()
            .to_string();
        let stderr = String::from_utf8_lossy(&stderr_task.await.unwrap_or_default())
            .trim()
            .to_string();

        let outcome = if timed_out {
            RunOutcome::TimedOut
        } else {
            RunOutcome::from_stdout(&stdout)
        };

        Ok(SandboxRun {
            id,
            stdout,
            stderr,
            duration: started.elapsed(),
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox() -> Sandbox {
        Sandbox::new("python3", Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_numeric_snippet_prints_exact_json() {
        let run = sandbox()
            .run("result = {\"Q\": 2 * 4186 * (60 - 20)}\nprint(json.dumps(result))")
            .await
            .unwrap();

        assert_eq!(run.stdout, "{\"Q\": 334880}");
        assert_eq!(run.stderr, "");
        match run.outcome {
            RunOutcome::Success { result } => assert_eq!(result["Q"], 334880),
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_raising_snippet_is_captured_as_json_error() {
        let run = sandbox().run("x = 1 / 0").await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&run.stdout).unwrap();
        assert!(value["error"].as_str().unwrap().contains("division"));
        assert!(matches!(run.outcome, RunOutcome::RuntimeFailure { .. }));
    }

    #[tokio::test]
    async fn test_infinite_loop_is_killed_at_the_deadline() {
        let quick = Sandbox::new("python3", Duration::from_secs(1));
        let started = Instant::now();

        let run = quick.run("while True:\n    pass").await.unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_secs(3), "kill took {:?}", elapsed);
        assert_eq!(run.outcome, RunOutcome::TimedOut);
        assert!(run.stdout.is_empty());
    }

    #[tokio::test]
    async fn test_stderr_alone_is_not_a_failure() {
        let run = sandbox()
            .run(
                "import sys\nsys.stderr.write(\"careful now\\n\")\nprint(json.dumps({\"ok\": True}))",
            )
            .await
            .unwrap();

        assert_eq!(run.stderr, "careful now");
        assert!(matches!(run.outcome, RunOutcome::Success { .. }));
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_a_spawn_error() {
        let broken = Sandbox::new("definitely-not-an-interpreter", Duration::from_secs(1));
        let err = broken.run("print(json.dumps({}))").await.unwrap_err();
        assert!(matches!(err, AppError::SandboxSpawn(_)));
    }

    #[tokio::test]
    async fn test_concurrent_runs_do_not_interfere() {
        let sandbox = sandbox();

        let runs = futures::future::join_all((0..10).map(|i| {
            let sandbox = sandbox.clone();
            async move {
                let code = format!("print(json.dumps({{\"n\": {} * {}}}))", i, i);
                (i, sandbox.run(&code).await.unwrap())
            }
        }))
        .await;

        for (i, run) in runs {
            match run.outcome {
                RunOutcome::Success { result } => {
                    assert_eq!(result["n"], i * i, "run {} was contaminated", i);
                }
                other => panic!("run {} failed: {:?}", i, other),
            }
        }
    }
}
