//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

use serde_json::Value;

use super::error::HandlerError;
use super::registry::ToolContext;
use super::schema::{ParameterSpec, ToolSpec, ValidatedArgs};

pub mod base64_convert;
pub mod calculate;
pub mod generate_hash;
pub mod generate_uuid;
pub mod json_format;
pub mod notes;
pub mod system_info;
pub mod text_transform;

pub use base64_convert::Base64ConvertTool;
pub use calculate::CalculateTool;
pub use generate_hash::GenerateHashTool;
pub use generate_uuid::GenerateUuidTool;
pub use json_format::JsonFormatTool;
pub use notes::{NoteCreateTool, NoteDeleteTool, NoteListTool, NoteReadTool};
pub use system_info::SystemInfoTool;
pub use text_transform::TextTransformTool;

/// A tool the registry can hold.
///
/// `handle` must be a plain function: the registry stores it as a `fn`
/// pointer next to the spec built from `NAME`, `DESCRIPTION` and
/// `parameters()`.
pub trait ToolDefinition {
    /// Tool name as registered in MCP.
    const NAME: &'static str;

    /// Tool description shown to clients.
    const DESCRIPTION: &'static str;

    /// Declared parameters, in validation order.
    fn parameters() -> Vec<ParameterSpec>;

    /// Run the tool on validated arguments.
    fn handle(ctx: &ToolContext, args: &ValidatedArgs) -> Result<Value, HandlerError>;

    /// Full spec of the tool.
    fn spec() -> ToolSpec {
        ToolSpec::new(Self::NAME, Self::DESCRIPTION, Self::parameters())
    }
}
