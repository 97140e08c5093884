//! Tool Registry - central registration of all tools.
//!
//! This module provides:
//! - A name-indexed table of tool specs and their handler functions
//! - Registration of the built-in tool set
//! - Tool metadata for listing
//!
//! The registry is filled once at startup and only read afterwards, so it is
//! shared behind an `Arc` without any locking.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use super::definitions::{
    Base64ConvertTool, CalculateTool, GenerateHashTool, GenerateUuidTool, JsonFormatTool,
    NoteCreateTool, NoteDeleteTool, NoteListTool, NoteReadTool, SystemInfoTool,
    TextTransformTool, ToolDefinition,
};
use super::error::{HandlerError, ToolError};
use super::schema::{ToolSpec, ValidatedArgs};
use crate::domains::notes::NoteStore;

/// Shared dependencies handed to every tool handler.
#[derive(Clone)]
pub struct ToolContext {
    notes: Arc<dyn NoteStore>,
}

impl ToolContext {
    /// Create a context around the given note store.
    pub fn new(notes: Arc<dyn NoteStore>) -> Self {
        Self { notes }
    }

    /// The note store.
    pub fn notes(&self) -> &dyn NoteStore {
        self.notes.as_ref()
    }
}

/// Signature every tool handler implements.
pub type ToolHandlerFn = fn(&ToolContext, &ValidatedArgs) -> Result<Value, HandlerError>;

struct RegisteredTool {
    spec: ToolSpec,
    handler: ToolHandlerFn,
}

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in tool.
    ///
    /// This is the single source of truth for the tool catalog. Both the
    /// STDIO and HTTP transports list and dispatch through it.
    pub fn builtin() -> Result<Self, ToolError> {
        let mut registry = Self::new();
        registry.register_tool::<CalculateTool>()?;
        registry.register_tool::<TextTransformTool>()?;
        registry.register_tool::<SystemInfoTool>()?;
        registry.register_tool::<NoteCreateTool>()?;
        registry.register_tool::<NoteListTool>()?;
        registry.register_tool::<NoteReadTool>()?;
        registry.register_tool::<NoteDeleteTool>()?;
        registry.register_tool::<GenerateHashTool>()?;
        registry.register_tool::<GenerateUuidTool>()?;
        registry.register_tool::<JsonFormatTool>()?;
        registry.register_tool::<Base64ConvertTool>()?;
        info!("Registered {} tools", registry.len());
        Ok(registry)
    }

    /// Register a tool spec with its handler.
    pub fn register(&mut self, spec: ToolSpec, handler: ToolHandlerFn) -> Result<(), ToolError> {
        if self.index.contains_key(spec.name) {
            return Err(ToolError::DuplicateTool(spec.name.to_string()));
        }
        self.index.insert(spec.name, self.tools.len());
        self.tools.push(RegisteredTool { spec, handler });
        Ok(())
    }

    /// Register a tool from its definition.
    pub fn register_tool<T: ToolDefinition>(&mut self) -> Result<(), ToolError> {
        self.register(T::spec(), T::handle)
    }

    /// Look up a tool spec by name.
    pub fn lookup(&self, name: &str) -> Result<&ToolSpec, ToolError> {
        self.entry(name).map(|tool| &tool.spec)
    }

    /// Spec and handler of a tool.
    pub(crate) fn resolve(&self, name: &str) -> Result<(&ToolSpec, ToolHandlerFn), ToolError> {
        self.entry(name).map(|tool| (&tool.spec, tool.handler))
    }

    fn entry(&self, name: &str) -> Result<&RegisteredTool, ToolError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::unknown_tool(name))
    }

    /// All tool specs in registration order.
    pub fn list_all(&self) -> Vec<&ToolSpec> {
        self.tools.iter().map(|tool| &tool.spec).collect()
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.spec.name).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::error::ErrorKind;

    fn noop(_: &ToolContext, _: &ValidatedArgs) -> Result<Value, HandlerError> {
        Ok(Value::Null)
    }

    #[test]
    fn test_registry_tool_names() {
        let registry = ToolRegistry::builtin().unwrap();
        let names = registry.tool_names();
        assert_eq!(
            names,
            vec![
                "calculate",
                "text_transform",
                "system_info",
                "note_create",
                "note_list",
                "note_read",
                "note_delete",
                "generate_hash",
                "generate_uuid",
                "json_format",
                "base64_convert",
            ]
        );
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolSpec::new("echo", "first", vec![]), noop)
            .unwrap();
        let err = registry
            .register(ToolSpec::new("echo", "second", vec![]), noop)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateTool);
        assert_eq!(registry.lookup("echo").unwrap().description, "first");
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = ToolRegistry::builtin().unwrap();
        let err = registry.lookup("unknown").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTool);
    }

    #[test]
    fn test_list_all_matches_names() {
        let registry = ToolRegistry::builtin().unwrap();
        let listed: Vec<_> = registry.list_all().iter().map(|s| s.name).collect();
        assert_eq!(listed, registry.tool_names());
        assert!(!registry.is_empty());
    }
}
