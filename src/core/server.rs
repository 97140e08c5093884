//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol by delegating to domain-specific services.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/` and registered once in
//! `ToolRegistry::builtin()`. The server owns a single [`Dispatcher`] over
//! that registry. The STDIO handler below and the HTTP handlers both list and
//! call tools through it, so every transport sees the same tool catalog and
//! every tool name, known or not, gets an envelope back.

use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::{Config, NoteBackend};
use crate::domains::notes::{FileNoteStore, MemoryNoteStore, NoteStore};
use crate::domains::resources::{ResourceContext, ResourceError, ResourceService};
use crate::domains::tools::{Dispatcher, ToolRegistry, ToolRequest, ToolResponse, router};

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp and coordinates
/// between the tool dispatcher and the resource service.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Validates and runs tool calls.
    dispatcher: Arc<Dispatcher>,

    /// Service for handling resource-related requests.
    resource_service: Arc<ResourceService>,
}

impl McpServer {
    /// Instructions sent to clients on initialize.
    pub const INSTRUCTIONS: &'static str = "Utility MCP server. Tools: calculate, text_transform, \
        system_info, note_create, note_list, note_read, note_delete, generate_hash, \
        generate_uuid, json_format, base64_convert. Resources: utility://notes and \
        utility://server-info.";

    /// Create a new MCP server with the given configuration.
    ///
    /// The note backend is picked from `config.notes`.
    pub fn new(config: Config) -> super::error::Result<Self> {
        config.validate()?;

        let notes: Arc<dyn NoteStore> = match config.notes.backend {
            NoteBackend::File => Arc::new(FileNoteStore::new(config.notes.path.clone())),
            NoteBackend::Memory => {
                info!("Using in-memory note store; notes are lost on exit");
                Arc::new(MemoryNoteStore::new())
            }
        };

        Self::with_note_store(config, notes)
    }

    /// Create a server around an already constructed note store.
    pub fn with_note_store(
        config: Config,
        notes: Arc<dyn NoteStore>,
    ) -> super::error::Result<Self> {
        let config = Arc::new(config);

        let registry = Arc::new(ToolRegistry::builtin()?);
        let tool_names = registry.tool_names();
        let dispatcher = Arc::new(Dispatcher::new(registry, notes.clone()));

        let context = ResourceContext::new(notes, config.server.name.clone(), tool_names);
        let resource_service = Arc::new(ResourceService::new(context));

        Ok(Self {
            config,
            dispatcher,
            resource_service,
        })
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// The tool dispatcher shared by all transports.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<Value> {
        self.dispatcher
            .registry()
            .list_all()
            .into_iter()
            .map(|spec| {
                json!({
                    "name": spec.name,
                    "description": spec.description,
                    "inputSchema": spec.input_schema()
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    pub async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> ToolResponse {
        self.dispatcher
            .dispatch_blocking(ToolRequest::new(name, arguments))
            .await
    }

    /// List all available resources (for HTTP transport).
    pub fn list_resources(&self) -> Vec<Value> {
        self.resource_service
            .list_resources()
            .into_iter()
            .map(|r| {
                json!({
                    "uri": r.raw.uri,
                    "name": r.raw.name,
                    "description": r.raw.description,
                    "mimeType": r.raw.mime_type
                })
            })
            .collect()
    }

    /// Read a resource's JSON content by URI.
    pub fn read_resource_json(&self, uri: &str) -> Result<Value, ResourceError> {
        self.resource_service.read_json(uri)
    }

    /// Read a resource by URI as MCP contents.
    pub fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ResourceError> {
        self.resource_service.read_resource(uri)
    }
}

/// ServerHandler implementation; tools and resources both go through the
/// shared services.
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            instructions: Some(Self::INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        info!("Listing tools");
        Ok(ListToolsResult {
            tools: router::list_tools(self.dispatcher.registry()),
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context), fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(router::call_tool(&self.dispatcher, request).await)
    }

    #[instrument(skip(self, _context))]
    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        info!("Listing resources");
        Ok(ListResourcesResult {
            resources: self.resource_service.list_resources(),
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context))]
    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        info!("Reading resource: {}", request.uri);
        self.resource_service
            .read_resource(&request.uri)
            .map_err(|e| match e {
                ResourceError::NotFound(_) => McpError::resource_not_found(e.to_string(), None),
                other => McpError::internal_error(other.to_string(), None),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::notes::Note;
    use rmcp::ServiceExt;
    use std::time::Duration;
    use tokio::io::{
        AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf,
    };

    fn server() -> McpServer {
        McpServer::with_note_store(Config::default(), Arc::new(MemoryNoteStore::new())).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.server.name = "  ".to_string();
        assert!(McpServer::new(config).is_err());
    }

    #[test]
    fn test_info_advertises_tools_and_resources() {
        let info = server().get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
        assert!(info.capabilities.prompts.is_none());
    }

    #[test]
    fn test_list_tools_matches_registry() {
        let server = server();
        let tools = server.list_tools();
        assert_eq!(tools.len(), server.dispatcher().registry().len());
        assert_eq!(tools[0]["name"], "calculate");
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn test_call_tool_round_trips_through_dispatcher() {
        let server = server();
        let mut args = Map::new();
        args.insert("title".into(), json!("Groceries"));
        args.insert("content".into(), json!("milk"));

        let created = server.call_tool("note_create", args).await;
        assert!(created.is_success());

        let listed = server.call_tool("note_list", Map::new()).await;
        assert_eq!(listed.payload().unwrap()["count"], 1);
    }

    #[test]
    fn test_notes_resource_sees_tool_writes() {
        let notes = Arc::new(MemoryNoteStore::new());
        notes.put(Note::new("a", "b")).unwrap();
        let server = McpServer::with_note_store(Config::default(), notes).unwrap();

        let content = server.read_resource_json("utility://notes").unwrap();
        assert_eq!(content["count"], 1);

        let listed = server.list_resources();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["mimeType"], "application/json");
    }

    #[test]
    fn test_unknown_resource() {
        let err = server().read_resource("utility://nope").unwrap_err();
        assert!(matches!(err, ResourceError::NotFound(_)));
    }

    #[test]
    fn test_info_reports_configured_identity() {
        let mut config = Config::default();
        config.server.name = "notes-box".to_string();
        let server =
            McpServer::with_note_store(config, Arc::new(MemoryNoteStore::new())).unwrap();

        let info = server.get_info();
        assert_eq!(info.server_info.name, "notes-box");
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
    }

    /// Line-delimited JSON-RPC client talking to a served `McpServer`.
    struct Client {
        lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
        writer: WriteHalf<DuplexStream>,
    }

    impl Client {
        fn connect(server: McpServer) -> Self {
            let (client_io, server_io) = tokio::io::duplex(64 * 1024);
            tokio::spawn(async move {
                if let Ok(running) = server.serve(tokio::io::split(server_io)).await {
                    let _ = running.waiting().await;
                }
            });

            let (reader, writer) = tokio::io::split(client_io);
            Self {
                lines: BufReader::new(reader).lines(),
                writer,
            }
        }

        async fn send(&mut self, message: Value) {
            let line = format!("{message}\n");
            self.writer.write_all(line.as_bytes()).await.unwrap();
            self.writer.flush().await.unwrap();
        }

        async fn request(&mut self, id: u64, method: &str, params: Value) -> Value {
            self.send(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
                .await;
            tokio::time::timeout(Duration::from_secs(10), async {
                loop {
                    let line = self.lines.next_line().await.unwrap().unwrap();
                    let message: Value = serde_json::from_str(&line).unwrap();
                    if message["id"] == json!(id) {
                        return message;
                    }
                }
            })
            .await
            .unwrap()
        }

        async fn call(&mut self, id: u64, name: &str, arguments: Value) -> Value {
            let response = self
                .request(id, "tools/call", json!({"name": name, "arguments": arguments}))
                .await;
            assert!(response.get("error").is_none(), "{response}");
            response["result"].clone()
        }
    }

    #[tokio::test]
    async fn test_stdio_session_returns_envelopes() {
        let mut client = Client::connect(server());

        let init = client
            .request(
                1,
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "session-test", "version": "0.0.0"}
                }),
            )
            .await;
        assert_eq!(init["result"]["serverInfo"]["name"], "utility-mcp-server");
        assert_eq!(
            init["result"]["serverInfo"]["version"],
            env!("CARGO_PKG_VERSION")
        );
        client
            .send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;

        let listed = client.request(2, "tools/list", json!({})).await;
        assert_eq!(listed["result"]["tools"].as_array().unwrap().len(), 11);

        let ok = client.call(3, "calculate", json!({"expression": "2 + 2"})).await;
        assert_eq!(ok["isError"], false);
        assert_eq!(ok["structuredContent"]["payload"]["result"], 4.0);

        let invalid = client.call(4, "calculate", json!({})).await;
        assert_eq!(invalid["isError"], true);
        assert_eq!(
            invalid["structuredContent"]["error"]["kind"],
            "MissingParameter"
        );

        let unknown = client.call(5, "nope", json!({})).await;
        assert_eq!(unknown["isError"], true);
        assert_eq!(unknown["structuredContent"]["status"], "failure");
        assert_eq!(unknown["structuredContent"]["error"]["kind"], "UnknownTool");
        assert_eq!(
            unknown["structuredContent"]["error"]["message"],
            "Unknown tool: nope"
        );
    }
}
