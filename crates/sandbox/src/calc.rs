//! Typed calculation requests.
//!
//! A calculation is described as data — an operation plus operands —
//! and validated before anything executes. Rendering still produces a
//! snippet that runs through the process sandbox; free-form snippets
//! take the same path, with isolation as the mitigating control.

use serde::{Deserialize, Serialize};

use thermo_core::{AppError, AppResult};

/// Arithmetic operation folded left-to-right over the operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalcOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl CalcOp {
    /// Parse an operation name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "add" | "+" => Some(Self::Add),
            "subtract" | "sub" | "-" => Some(Self::Subtract),
            "multiply" | "mul" | "*" => Some(Self::Multiply),
            "divide" | "div" | "/" => Some(Self::Divide),
            "power" | "pow" | "**" => Some(Self::Power),
            _ => None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Power => "**",
        }
    }
}

/// A numeric calculation described by data instead of code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalcRequest {
    /// JSON key under which the result is reported
    pub label: String,

    /// Operation applied across the operands
    pub op: CalcOp,

    /// Two or more operands
    pub operands: Vec<f64>,
}

impl CalcRequest {
    pub fn new(label: impl Into<String>, op: CalcOp, operands: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            op,
            operands,
        }
    }

    /// Reject malformed requests before any process is spawned.
    pub fn validate(&self) -> AppResult<()> {
        if self.label.is_empty()
            || !self
                .label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::Calc(format!(
                "label '{}' must be non-empty and use only letters, digits, or underscores",
                self.label
            )));
        }

        if self.operands.len() < 2 {
            return Err(AppError::Calc(
                "at least two operands are required".to_string(),
            ));
        }

        if let Some(bad) = self.operands.iter().find(|v| !v.is_finite()) {
            return Err(AppError::Calc(format!("operand {} is not finite", bad)));
        }

        if self.op == CalcOp::Divide && self.operands[1..].iter().any(|v| *v == 0.0) {
            return Err(AppError::Calc("division by zero".to_string()));
        }

        Ok(())
    }

    /// Render the validated request as a sandbox snippet.
    pub fn render(&self) -> AppResult<String> {
        self.validate()?;

        let expr = match self.op {
            // Python's ** is right-associative; parenthesize the fold
            CalcOp::Power => self.operands[1..].iter().fold(
                format_operand(self.operands[0]),
                |acc, v| format!("({} ** {})", acc, format_operand(*v)),
            ),
            _ => self
                .operands
                .iter()
                .map(|v| format_operand(*v))
                .collect::<Vec<_>>()
                .join(&format!(" {} ", self.op.symbol())),
        };

        Ok(format!(
            "result = {{\"{}\": {}}}\nprint(json.dumps(result))",
            self.label, expr
        ))
    }
}

/// Negative operands are parenthesized so they survive operator splicing.
fn format_operand(value: f64) -> String {
    if value < 0.0 {
        format!("({})", value)
    } else {
        format!("{}", value)
    }
}
