//! Base64 converter tool definition.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use super::ToolDefinition;
use crate::domains::tools::error::HandlerError;
use crate::domains::tools::registry::ToolContext;
use crate::domains::tools::schema::{ParameterSpec, ValidatedArgs};

const OPERATIONS: &[&str] = &[
    Operation::Encode.as_str(),
    Operation::Decode.as_str(),
];

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Operation {
    Encode,
    Decode,
}

impl Operation {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Encode => "encode",
            Self::Decode => "decode",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Base64ConvertParams {
    text: String,
    operation: Operation,
}

/// Base64 tool - standard alphabet with padding.
pub struct Base64ConvertTool;

impl ToolDefinition for Base64ConvertTool {
    const NAME: &'static str = "base64_convert";

    const DESCRIPTION: &'static str = "Encode text to Base64 or decode Base64 back to text.";

    fn parameters() -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::string("text", "Text to encode, or Base64 to decode").required(),
            ParameterSpec::string("operation", "Conversion direction")
                .required()
                .one_of(OPERATIONS),
        ]
    }

    #[instrument(skip_all)]
    fn handle(_ctx: &ToolContext, args: &ValidatedArgs) -> Result<Value, HandlerError> {
        let params: Base64ConvertParams = args.decode()?;

        let result = match params.operation {
            Operation::Encode => STANDARD.encode(params.text.as_bytes()),
            Operation::Decode => {
                let bytes = STANDARD
                    .decode(params.text.trim())
                    .map_err(|e| HandlerError::Decode(e.to_string()))?;
                String::from_utf8(bytes).map_err(|_| {
                    HandlerError::Decode("decoded bytes are not valid UTF-8".to_string())
                })?
            }
        };

        Ok(json!({
            "operation": params.operation.as_str(),
            "result": result,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::notes::MemoryNoteStore;
    use crate::domains::tools::error::HandlerErrorKind;
    use serde_json::Map;
    use std::sync::Arc;

    fn run(text: &str, operation: &str) -> Result<Value, HandlerError> {
        let ctx = ToolContext::new(Arc::new(MemoryNoteStore::new()));
        let mut raw = Map::new();
        raw.insert("text".into(), json!(text));
        raw.insert("operation".into(), json!(operation));
        let args = Base64ConvertTool::spec().validate(&raw).unwrap();
        Base64ConvertTool::handle(&ctx, &args)
    }

    #[test]
    fn test_operations_names_match_serde() {
        for name in OPERATIONS {
            let parsed: Operation = serde_json::from_value(json!(name)).unwrap();
            assert_eq!(parsed.as_str(), *name);
        }
    }

    #[test]
    fn test_encode_decode() {
        assert_eq!(run("Hello World", "encode").unwrap()["result"], "SGVsbG8gV29ybGQ=");
        assert_eq!(run("SGVsbG8gV29ybGQ=", "decode").unwrap()["result"], "Hello World");
    }

    #[test]
    fn test_decode_failures() {
        let err = run("not base64!", "decode").unwrap_err();
        assert_eq!(err.kind(), HandlerErrorKind::DecodeError);

        // 0xff 0xfe is not UTF-8.
        let err = run("//4=", "decode").unwrap_err();
        assert_eq!(err.kind(), HandlerErrorKind::DecodeError);
    }
}
