//! Calculator tool definition.
//!
//! Evaluates arithmetic expressions with the restricted parser in
//! [`parser`]. There is no fallback to any general-purpose evaluator.

mod parser;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

pub use parser::{CalcError, MAX_DEPTH, MAX_EXPRESSION_LEN, evaluate};

use super::ToolDefinition;
use crate::domains::tools::error::HandlerError;
use crate::domains::tools::registry::ToolContext;
use crate::domains::tools::schema::{ParameterSpec, ValidatedArgs};

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Deserialize)]
struct CalculateParams {
    expression: String,
}

impl From<CalcError> for HandlerError {
    fn from(err: CalcError) -> Self {
        HandlerError::evaluation(err.to_string())
    }
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Calculator tool - evaluates arithmetic expressions.
pub struct CalculateTool;

impl ToolDefinition for CalculateTool {
    const NAME: &'static str = "calculate";

    const DESCRIPTION: &'static str = "Perform mathematical calculations. Supports + - * / % ** \
        (or ^), parentheses, the constants pi and e, and the functions sqrt, sin, cos, tan, log, \
        log10, log2, exp, abs, floor, ceil, round, min, max and pow.";

    fn parameters() -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::string(
                "expression",
                "Mathematical expression to evaluate (e.g., '2 + 2', 'sqrt(16)', 'sin(pi/2)')",
            )
            .required(),
        ]
    }

    #[instrument(skip_all)]
    fn handle(_ctx: &ToolContext, args: &ValidatedArgs) -> Result<Value, HandlerError> {
        let params: CalculateParams = args.decode()?;
        let result = evaluate(&params.expression)?;
        debug!("{} = {}", params.expression, result);

        Ok(json!({
            "expression": params.expression,
            "result": result,
        }))
    }
}
