//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Tools are executable functions that can be called by MCP clients to perform
//! specific actions or computations.
//!
//! ## Architecture
//!
//! - `schema.rs` - Parameter declarations and argument validation
//! - `definitions/` - Individual tool implementations
//! - `registry.rs` - Central tool registry (name to spec and handler)
//! - `dispatcher.rs` - Validate-then-invoke, producing the response envelope
//! - `router.rs` - MCP tool listing and `tools/call` adapters for STDIO
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` implementing `ToolDefinition`
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it in `ToolRegistry::builtin()`
//!
//! Both transports pick it up from the registry; nothing else changes.

pub mod definitions;
pub mod dispatcher;
mod error;
mod registry;
pub mod router;
pub mod schema;

pub use dispatcher::{Dispatcher, ErrorInfo, ToolRequest, ToolResponse};
pub use error::{ErrorKind, HandlerError, HandlerErrorKind, ToolError};
pub use registry::{ToolContext, ToolHandlerFn, ToolRegistry};
pub use schema::{ArgValue, ParamType, ParameterSpec, ToolSpec, ValidatedArgs};
