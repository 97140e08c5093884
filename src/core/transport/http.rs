//! HTTP transport implementation.
//!
//! Serves two surfaces over the same dispatcher:
//! - REST: `GET /tools`, `POST /tools/{name}`, `GET /resources[/{name}]`
//! - JSON-RPC 2.0 over POST at the configured path (default `/mcp`)
//!
//! This allows standard HTTP clients (curl, browsers, etc.) to call tools
//! without speaking MCP.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;
use crate::domains::resources::{ResourceError, ResourceService};
use crate::domains::tools::router::to_call_tool_result;
use crate::domains::tools::{ErrorKind, HandlerErrorKind, ToolError, ToolResponse};

/// MCP protocol revision reported by `initialize`.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Parse error.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::error(None, -32700, msg)
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg)
    }

    /// Internal error.
    pub fn internal_error(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32603, msg)
    }
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
struct AppState {
    server: McpServer,
    rpc_path: String,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = build_router(server, &self.config);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (CORS {})", addr, cors_status);
        info!("  → Tools:     GET /tools, POST /tools/{{name}}");
        info!("  → Resources: GET /resources, GET /resources/{{name}}");
        info!("  → JSON-RPC:  POST {}", self.config.rpc_path);
        info!("  → Health:    GET /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Build the axum router serving both the REST and JSON-RPC surfaces.
pub fn build_router(server: McpServer, config: &HttpConfig) -> Router {
    let state = AppState {
        server,
        rpc_path: config.rpc_path.clone(),
    };

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/tools", get(list_tools))
        .route("/tools/{name}", post(call_tool))
        .route("/resources", get(list_resources))
        .route("/resources/{name}", get(read_resource))
        .route(&config.rpc_path, post(handle_rpc))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Add CORS if enabled
    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// HTTP status for a tool response.
pub fn status_for(response: &ToolResponse) -> StatusCode {
    let Some(error) = response.error() else {
        return StatusCode::OK;
    };

    match error.kind {
        ErrorKind::UnknownTool => StatusCode::NOT_FOUND,
        ErrorKind::HandlerError => match error.cause {
            Some(HandlerErrorKind::StorageError | HandlerErrorKind::Internal) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        },
        ErrorKind::MissingParameter
        | ErrorKind::TypeMismatch
        | ErrorKind::InvalidValue
        | ErrorKind::UnexpectedParameter
        | ErrorKind::DuplicateTool
        | ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
    }
}

/// Parse a request body as a JSON object; an empty body is `{}`.
fn parse_arguments(body: &[u8]) -> Result<Map<String, Value>, ToolError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(arguments)) => Ok(arguments),
        Ok(_) => Err(ToolError::invalid_request(
            "request body must be a JSON object of arguments",
        )),
        Err(e) => Err(ToolError::invalid_request(format!(
            "request body is not valid JSON: {e}"
        ))),
    }
}

// ============================================================================
// REST handlers
// ============================================================================

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "description": "MCP utility server: calculator, text, hashing, encoding, UUID and note tools",
        "transport": "HTTP",
        "endpoints": {
            "health": "GET /health",
            "tools": "GET /tools",
            "call_tool": "POST /tools/{name}",
            "resources": "GET /resources",
            "read_resource": "GET /resources/{name}",
            "rpc": format!("POST {}", state.rpc_path),
        },
        "protocol": "JSON-RPC 2.0",
    }))
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "server": state.server.name(),
        "version": state.server.version(),
    }))
}

async fn list_tools(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "tools": state.server.list_tools() }))
}

#[instrument(skip(state, body))]
async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let response = match parse_arguments(&body) {
        Ok(arguments) => state.server.call_tool(&name, arguments).await,
        Err(err) => {
            warn!("Rejected call to '{}': {}", name, err);
            ToolResponse::failure(&err)
        }
    };

    (status_for(&response), Json(response)).into_response()
}

async fn list_resources(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "resources": state.server.list_resources() }))
}

#[instrument(skip(state))]
async fn read_resource(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let uri = ResourceService::resolve_uri(&name);
    match state.server.read_resource_json(&uri) {
        Ok(content) => Json(json!({ "uri": uri, "content": content })).into_response(),
        Err(err) => {
            let status = match err {
                ResourceError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}

// ============================================================================
// JSON-RPC handlers
// ============================================================================

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method = tracing::field::Empty))]
async fn handle_rpc(State(state): State<AppState>, body: Bytes) -> Response {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Unparsable JSON-RPC request: {}", e);
            return Json(JsonRpcResponse::parse_error(e.to_string())).into_response();
        }
    };

    tracing::Span::current().record("method", request.method.as_str());
    info!("Received JSON-RPC request: {}", request.method);

    if request.method.starts_with("notifications/") {
        info!("Received notification: {}", request.method);
        return StatusCode::ACCEPTED.into_response();
    }

    Json(process_request(&state, request).await).into_response()
}

/// Process a JSON-RPC request and return the response.
async fn process_request(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    // Validate JSON-RPC version
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(state, request),
        "ping" => JsonRpcResponse::success(request.id, json!({})),
        "tools/list" => {
            JsonRpcResponse::success(request.id, json!({ "tools": state.server.list_tools() }))
        }
        "tools/call" => handle_tools_call(state, request).await,
        "resources/list" => JsonRpcResponse::success(
            request.id,
            json!({ "resources": state.server.list_resources() }),
        ),
        "resources/read" => handle_resources_read(state, request),
        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

/// Handle initialize request.
fn handle_initialize(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing initialize request");

    let result = json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {},
            "resources": {}
        },
        "serverInfo": {
            "name": state.server.name(),
            "version": state.server.version()
        },
        "instructions": McpServer::INSTRUCTIONS
    });

    JsonRpcResponse::success(request.id, result)
}

/// Handle tools/call request.
async fn handle_tools_call(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let params = request.params.unwrap_or(Value::Null);

    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::invalid_params(request.id, "Missing tool name");
    };

    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(arguments)) => arguments.clone(),
        Some(_) => {
            return JsonRpcResponse::invalid_params(request.id, "Tool arguments must be an object");
        }
    };

    let response = state.server.call_tool(name, arguments).await;
    match serde_json::to_value(to_call_tool_result(&response)) {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
    }
}

/// Handle resources/read request.
fn handle_resources_read(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let params = request.params.unwrap_or(Value::Null);

    let Some(uri) = params.get("uri").and_then(Value::as_str) else {
        return JsonRpcResponse::invalid_params(request.id, "Missing resource URI");
    };

    let result = state
        .server
        .read_resource(uri)
        .map_err(|e| e.to_string())
        .and_then(|result| serde_json::to_value(result).map_err(|e| e.to_string()));

    match result {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(e) => JsonRpcResponse::invalid_params(request.id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::domains::notes::MemoryNoteStore;
    use axum::body::Body;
    use ::http::Request;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let server =
            McpServer::with_note_store(Config::default(), Arc::new(MemoryNoteStore::new()))
                .unwrap();
        build_router(server, &HttpConfig::default())
    }

    async fn send(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(), "GET", "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let (status, body) = send(app(), "GET", "/", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endpoints"]["rpc"], "POST /mcp");
    }

    #[tokio::test]
    async fn test_list_tools() {
        let (status, body) = send(app(), "GET", "/tools", "").await;
        assert_eq!(status, StatusCode::OK);
        let tools = body["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 11);
        assert_eq!(tools[0]["name"], "calculate");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["expression"]));
    }

    #[tokio::test]
    async fn test_call_tool_success() {
        let (status, body) = send(
            app(),
            "POST",
            "/tools/calculate",
            r#"{"expression": "2 + 2"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["payload"]["result"], 4.0);
    }

    #[tokio::test]
    async fn test_call_tool_empty_body() {
        let (status, body) = send(app(), "POST", "/tools/note_list", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["payload"]["count"], 0);
    }

    #[tokio::test]
    async fn test_call_tool_status_codes() {
        let (status, body) = send(app(), "POST", "/tools/nope", "{}").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["kind"], "UnknownTool");

        let (status, body) = send(app(), "POST", "/tools/calculate", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "MissingParameter");

        let (status, body) = send(app(), "POST", "/tools/calculate", "[1, 2]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "InvalidRequest");

        let (status, body) =
            send(app(), "POST", "/tools/calculate", r#"{"expression": "1/0"}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["cause"], "EvaluationError");
    }

    #[tokio::test]
    async fn test_resources() {
        let (status, body) = send(app(), "GET", "/resources", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resources"].as_array().unwrap().len(), 2);

        let (status, body) = send(app(), "GET", "/resources/server-info", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["uri"], "utility://server-info");
        assert_eq!(body["content"]["tools"].as_array().unwrap().len(), 11);

        let (status, _) = send(app(), "GET", "/resources/missing", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rpc_tools_call() {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": {
                "name": "generate_hash",
                "arguments": {"text": "abc", "algorithm": "md5"}
            }
        });
        let (status, body) = send(app(), "POST", "/mcp", &request.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 7);
        assert_eq!(body["result"]["isError"], false);
        assert_eq!(
            body["result"]["structuredContent"]["payload"]["hash"],
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[tokio::test]
    async fn test_rpc_errors() {
        let (_, body) = send(app(), "POST", "/mcp", "{not json").await;
        assert_eq!(body["error"]["code"], -32700);

        let unknown = json!({"jsonrpc": "2.0", "id": 1, "method": "prompts/list"});
        let (_, body) = send(app(), "POST", "/mcp", &unknown.to_string()).await;
        assert_eq!(body["error"]["code"], -32601);

        let notification = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        let (status, _) = send(app(), "POST", "/mcp", &notification.to_string()).await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_rpc_initialize_and_list() {
        let init = json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}});
        let (_, body) = send(app(), "POST", "/mcp", &init.to_string()).await;
        assert_eq!(body["result"]["protocolVersion"], PROTOCOL_VERSION);

        let list = json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"});
        let (_, body) = send(app(), "POST", "/mcp", &list.to_string()).await;
        assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 11);
    }
}
