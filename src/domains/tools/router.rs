//! MCP adapters for the tool registry.
//!
//! The STDIO server lists tools and answers `tools/call` through these
//! functions. Every call goes to the shared [`Dispatcher`], including calls
//! naming a tool that is not registered, so MCP clients see the same
//! validation and envelopes as HTTP clients.

use std::sync::Arc;

use rmcp::model::{CallToolRequestParam, CallToolResult, Content, Tool};

use super::dispatcher::{Dispatcher, ToolRequest, ToolResponse};
use super::registry::ToolRegistry;
use super::schema::ToolSpec;

/// Tool models for every registered tool, in registration order.
pub fn list_tools(registry: &ToolRegistry) -> Vec<Tool> {
    registry.list_all().into_iter().map(to_tool).collect()
}

/// Run an MCP `tools/call` request through the dispatcher.
pub async fn call_tool(dispatcher: &Dispatcher, request: CallToolRequestParam) -> CallToolResult {
    let arguments = request.arguments.unwrap_or_default();
    let response = dispatcher
        .dispatch_blocking(ToolRequest::new(request.name, arguments))
        .await;
    to_call_tool_result(&response)
}

/// Create a Tool model (metadata) from a spec.
pub fn to_tool(spec: &ToolSpec) -> Tool {
    Tool {
        name: spec.name.into(),
        description: Some(spec.description.into()),
        input_schema: Arc::new(spec.input_schema()),
        annotations: None,
        output_schema: None,
        icons: None,
        meta: None,
        title: None,
    }
}

/// Wrap an envelope as an MCP tool result.
///
/// The text content is the pretty-printed envelope and the structured
/// content is the envelope itself; `is_error` mirrors a failure status.
pub fn to_call_tool_result(response: &ToolResponse) -> CallToolResult {
    let envelope = serde_json::to_value(response).unwrap_or_default();
    CallToolResult {
        content: vec![Content::text(format!("{envelope:#}"))],
        structured_content: Some(envelope),
        is_error: Some(!response.is_success()),
        meta: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::notes::MemoryNoteStore;
    use crate::domains::tools::error::ToolError;
    use serde_json::{Map, Value, json};

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            Arc::new(ToolRegistry::builtin().unwrap()),
            Arc::new(MemoryNoteStore::new()),
        )
    }

    fn request(name: &str, arguments: Option<Map<String, Value>>) -> CallToolRequestParam {
        serde_json::from_value(json!({ "name": name, "arguments": arguments })).unwrap()
    }

    #[test]
    fn test_list_tools_matches_registry() {
        let registry = ToolRegistry::builtin().unwrap();
        let tools = list_tools(&registry);
        assert_eq!(tools.len(), 11);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(names, registry.tool_names());
    }

    #[test]
    fn test_tool_schema_comes_from_spec() {
        let registry = ToolRegistry::builtin().unwrap();
        let tool = to_tool(registry.lookup("generate_uuid").unwrap());
        assert_eq!(tool.input_schema["properties"]["count"]["maximum"], 10);
        assert_eq!(tool.input_schema["additionalProperties"], false);
    }

    #[test]
    fn test_call_tool_result_mirrors_envelope() {
        let ok = to_call_tool_result(&ToolResponse::success(json!({"result": 4.0})));
        assert_eq!(ok.is_error, Some(false));
        assert_eq!(
            ok.structured_content,
            Some(json!({"status": "success", "payload": {"result": 4.0}}))
        );

        let failed = to_call_tool_result(&ToolResponse::failure(&ToolError::unknown_tool("x")));
        assert_eq!(failed.is_error, Some(true));
        assert_eq!(failed.structured_content.unwrap()["error"]["kind"], "UnknownTool");
    }

    #[tokio::test]
    async fn test_call_unknown_tool_returns_envelope() {
        let result = call_tool(&dispatcher(), request("nope", None)).await;
        assert_eq!(result.is_error, Some(true));
        let envelope = result.structured_content.unwrap();
        assert_eq!(envelope["status"], "failure");
        assert_eq!(envelope["error"]["kind"], "UnknownTool");
    }

    #[tokio::test]
    async fn test_call_without_arguments_is_validated() {
        let result = call_tool(&dispatcher(), request("calculate", None)).await;
        assert_eq!(
            result.structured_content.unwrap()["error"]["kind"],
            "MissingParameter"
        );

        let mut args = Map::new();
        args.insert("expression".into(), json!("6 * 7"));
        let result = call_tool(&dispatcher(), request("calculate", Some(args))).await;
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.structured_content.unwrap()["payload"]["result"], 42.0);
    }
}
