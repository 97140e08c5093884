//! Server info resource definition.

use serde_json::{Value, json};

use super::ResourceDefinition;
use crate::domains::resources::error::ResourceError;
use crate::domains::resources::service::ResourceContext;

/// Server information resource (dynamic).
pub struct ServerInfoResource;

impl ResourceDefinition for ServerInfoResource {
    const URI: &'static str = "utility://server-info";
    const NAME: &'static str = "Server Information";
    const DESCRIPTION: &'static str = "Name, version and tool catalog of this MCP server";
    const MIME_TYPE: &'static str = "application/json";

    fn read(ctx: &ResourceContext) -> Result<Value, ResourceError> {
        Ok(json!({
            "name": ctx.server_name(),
            "version": env!("CARGO_PKG_VERSION"),
            "tools": ctx.tool_names(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::notes::MemoryNoteStore;
    use std::sync::Arc;

    #[test]
    fn test_server_info_metadata() {
        assert_eq!(ServerInfoResource::URI, "utility://server-info");
        assert_eq!(ServerInfoResource::MIME_TYPE, "application/json");
    }

    #[test]
    fn test_server_info_read() {
        let ctx = ResourceContext::new(
            Arc::new(MemoryNoteStore::new()),
            "test-server",
            vec!["calculate", "note_list"],
        );
        let info = ServerInfoResource::read(&ctx).unwrap();
        assert_eq!(info["name"], "test-server");
        assert_eq!(info["tools"], json!(["calculate", "note_list"]));
    }
}
