//! Calc command handler.
//!
//! Runs a numeric calculation in the isolated sandbox, either as a
//! typed request (operation + operands, validated first) or as a
//! free-form snippet.

use clap::Args;
use std::time::Duration;
use thermo_core::{config::AppConfig, AppError, AppResult};
use thermo_sandbox::{CalcOp, CalcRequest, RunOutcome, Sandbox};

/// Run a numeric calculation in the sandbox
#[derive(Args, Debug)]
pub struct CalcCommand {
    /// Free-form Python snippet; should print one JSON line
    #[arg(long, conflicts_with = "op")]
    pub expr: Option<String>,

    /// Typed operation (add, subtract, multiply, divide, power)
    #[arg(long)]
    pub op: Option<String>,

    /// Comma-separated operands for the typed operation
    #[arg(long, value_delimiter = ',', requires = "op")]
    pub operands: Vec<f64>,

    /// Result key for the typed operation
    #[arg(long, default_value = "result")]
    pub label: String,

    /// Timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Output the full run record as JSON
    #[arg(long)]
    pub json: bool,
}

impl CalcCommand {
    /// Execute the calc command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing calc command");

        let snippet = self.build_snippet()?;

        let timeout_secs = self.timeout.unwrap_or(config.sandbox.timeout_secs);
        let sandbox = Sandbox::new(
            &config.sandbox.python_bin,
            Duration::from_secs(timeout_secs),
        );

        let run = sandbox.run(&snippet).await?;

        tracing::debug!("Sandbox run {} finished in {:?}", run.id, run.duration);

        if self.json {
            let json = serde_json::to_string_pretty(&run)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
            return Ok(());
        }

        match &run.outcome {
            RunOutcome::Success { result } => {
                let json = serde_json::to_string_pretty(result)
                    .map_err(|e| AppError::Serialization(e.to_string()))?;
                println!("{}", json);
            }
            RunOutcome::RuntimeFailure { message } => {
                // Short and human-readable; the child's own traces stay
                // in the sandbox.
                println!("calculation failed: {}", message);
            }
            RunOutcome::TimedOut => {
                println!(
                    "calculation timed out after {}s; try again or raise --timeout",
                    timeout_secs
                );
            }
        }

        if !run.stderr.is_empty() {
            tracing::debug!("Sandbox stderr: {}", run.stderr);
        }

        Ok(())
    }

    /// Resolve the snippet from either the typed or the free-form path.
    fn build_snippet(&self) -> AppResult<String> {
        if let Some(ref expr) = self.expr {
            return Ok(expr.clone());
        }

        let op_name = self
            .op
            .as_deref()
            .ok_or_else(|| AppError::Calc("provide either --expr or --op".to_string()))?;

        let op = CalcOp::parse(op_name).ok_or_else(|| {
            AppError::Calc(format!(
                "unknown operation '{}'; expected add, subtract, multiply, divide, or power",
                op_name
            ))
        })?;

        CalcRequest::new(self.label.clone(), op, self.operands.clone()).render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(expr: Option<&str>, op: Option<&str>, operands: Vec<f64>) -> CalcCommand {
        CalcCommand {
            expr: expr.map(|s| s.to_string()),
            op: op.map(|s| s.to_string()),
            operands,
            label: "result".to_string(),
            timeout: None,
            json: false,
        }
    }

    #[test]
    fn test_free_form_snippet_passes_through() {
        let cmd = command(Some("print(json.dumps({\"x\": 1}))"), None, vec![]);
        assert_eq!(cmd.build_snippet().unwrap(), "print(json.dumps({\"x\": 1}))");
    }

    #[test]
    fn test_typed_request_renders() {
        let cmd = command(None, Some("multiply"), vec![2.0, 4186.0, 40.0]);
        let snippet = cmd.build_snippet().unwrap();
        assert!(snippet.contains("2 * 4186 * 40"));
    }

    #[test]
    fn test_missing_both_paths_is_an_error() {
        let cmd = command(None, None, vec![]);
        assert!(matches!(cmd.build_snippet(), Err(AppError::Calc(_))));
    }

    #[test]
    fn test_unknown_operation_is_an_error() {
        let cmd = command(None, Some("modulo"), vec![1.0, 2.0]);
        assert!(matches!(cmd.build_snippet(), Err(AppError::Calc(_))));
    }

    #[test]
    fn test_invalid_typed_request_rejected_before_execution() {
        let cmd = command(None, Some("divide"), vec![1.0, 0.0]);
        assert!(matches!(cmd.build_snippet(), Err(AppError::Calc(_))));
    }
}
