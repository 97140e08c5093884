//! Resource service implementation.
//!
//! The ResourceService manages resource discovery and access. Resources are
//! defined in `definitions/` and registered via `registry.rs`; their content
//! is computed on every read, so notes are always current.

use std::sync::Arc;

use rmcp::model::{ReadResourceResult, Resource, ResourceContents};
use serde_json::Value;
use tracing::{debug, info};

use super::definitions::URI_SCHEME;
use super::error::ResourceError;
use super::registry::get_all_resources;
use crate::domains::notes::NoteStore;

/// Produces the JSON content of a resource.
pub type ResourceReader = fn(&ResourceContext) -> Result<Value, ResourceError>;

/// An entry in the resource registry.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    /// The resource metadata.
    pub resource: Resource,

    /// The content provider for this resource.
    pub reader: ResourceReader,
}

/// Data resources are computed from.
#[derive(Clone)]
pub struct ResourceContext {
    notes: Arc<dyn NoteStore>,
    server_name: String,
    tool_names: Vec<&'static str>,
}

impl ResourceContext {
    pub fn new(
        notes: Arc<dyn NoteStore>,
        server_name: impl Into<String>,
        tool_names: Vec<&'static str>,
    ) -> Self {
        Self {
            notes,
            server_name: server_name.into(),
            tool_names,
        }
    }

    pub fn notes(&self) -> &dyn NoteStore {
        self.notes.as_ref()
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn tool_names(&self) -> &[&'static str] {
        &self.tool_names
    }
}

/// Service for managing and accessing resources.
pub struct ResourceService {
    context: ResourceContext,

    /// Registered resources, in listing order.
    resources: Vec<ResourceEntry>,
}

impl ResourceService {
    /// Create a new ResourceService over the given context.
    pub fn new(context: ResourceContext) -> Self {
        let resources = get_all_resources();
        for entry in &resources {
            info!("Registering resource: {}", entry.resource.raw.uri);
        }
        Self { context, resources }
    }

    /// List all available resources.
    pub fn list_resources(&self) -> Vec<Resource> {
        self.resources
            .iter()
            .map(|entry| entry.resource.clone())
            .collect()
    }

    /// Map a short name (`notes`) or full URI to the full URI.
    pub fn resolve_uri(name: &str) -> String {
        if name.contains("://") {
            name.to_string()
        } else {
            format!("{URI_SCHEME}{name}")
        }
    }

    /// Read a resource's JSON content by URI.
    pub fn read_json(&self, uri: &str) -> Result<Value, ResourceError> {
        let entry = self
            .resources
            .iter()
            .find(|entry| entry.resource.raw.uri == uri)
            .ok_or_else(|| ResourceError::not_found(uri))?;

        debug!("Reading resource {}", uri);
        (entry.reader)(&self.context)
    }

    /// Read a resource by URI as MCP contents.
    pub fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ResourceError> {
        let value = self.read_json(uri)?;
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| ResourceError::internal(e.to_string()))?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }
}
