//! UUID generator tool definition.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;
use uuid::Uuid;

use super::ToolDefinition;
use crate::domains::tools::error::HandlerError;
use crate::domains::tools::registry::ToolContext;
use crate::domains::tools::schema::{ArgValue, ParameterSpec, ValidatedArgs};

/// Most UUIDs one call may request.
pub const MAX_UUIDS: i64 = 10;

#[derive(Debug, Deserialize)]
struct GenerateUuidParams {
    count: usize,
}

/// UUID tool - generates random (v4) UUIDs.
pub struct GenerateUuidTool;

impl ToolDefinition for GenerateUuidTool {
    const NAME: &'static str = "generate_uuid";

    const DESCRIPTION: &'static str = "Generate one or more random UUIDs (version 4).";

    fn parameters() -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::integer("count", "Number of UUIDs to generate (1-10)")
                .range(1, MAX_UUIDS)
                .with_default(ArgValue::Integer(1)),
        ]
    }

    #[instrument(skip_all)]
    fn handle(_ctx: &ToolContext, args: &ValidatedArgs) -> Result<Value, HandlerError> {
        let params: GenerateUuidParams = args.decode()?;
        let uuids: Vec<String> = (0..params.count)
            .map(|_| Uuid::new_v4().to_string())
            .collect();

        Ok(json!({ "count": uuids.len(), "uuids": uuids }))
    }
}
