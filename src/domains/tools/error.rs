//! Tool-specific error types.
//!
//! Two layers: [`ToolError`] covers everything the dispatcher can report,
//! while [`HandlerError`] is what an individual tool handler may return.
//! Handler errors reach callers wrapped as [`ErrorKind::HandlerError`] with
//! their own [`HandlerErrorKind`] as the cause.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::schema::ParamType;
use crate::domains::notes::NoteStoreError;

/// Top-level category of a failed tool call, as seen on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    UnknownTool,
    DuplicateTool,
    MissingParameter,
    TypeMismatch,
    InvalidValue,
    UnexpectedParameter,
    HandlerError,
    InvalidRequest,
}

/// Tool-specific failure carried inside [`ErrorKind::HandlerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerErrorKind {
    EvaluationError,
    ParseError,
    DecodeError,
    DuplicateNote,
    NoteNotFound,
    InvalidInput,
    StorageError,
    Internal,
}

/// Errors returned by tool handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The calculator rejected or could not evaluate the expression.
    #[error("Invalid expression: {0}")]
    Evaluation(String),

    /// Input was not valid JSON.
    #[error("Invalid JSON: {0}")]
    Parse(String),

    /// Input was not valid Base64 or did not decode to UTF-8 text.
    #[error("Invalid Base64 input: {0}")]
    Decode(String),

    /// A note with this title already exists.
    #[error("Note '{0}' already exists")]
    DuplicateNote(String),

    /// No note has this title.
    #[error("Note '{0}' not found")]
    NoteNotFound(String),

    /// Input passed schema validation but is still unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The note store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Something that should not happen did.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Create a new "evaluation" error.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Create a new "invalid input" error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Wire category of this error.
    pub fn kind(&self) -> HandlerErrorKind {
        match self {
            Self::Evaluation(_) => HandlerErrorKind::EvaluationError,
            Self::Parse(_) => HandlerErrorKind::ParseError,
            Self::Decode(_) => HandlerErrorKind::DecodeError,
            Self::DuplicateNote(_) => HandlerErrorKind::DuplicateNote,
            Self::NoteNotFound(_) => HandlerErrorKind::NoteNotFound,
            Self::InvalidInput(_) => HandlerErrorKind::InvalidInput,
            Self::Storage(_) => HandlerErrorKind::StorageError,
            Self::Internal(_) => HandlerErrorKind::Internal,
        }
    }
}

impl From<NoteStoreError> for HandlerError {
    fn from(err: NoteStoreError) -> Self {
        match err {
            NoteStoreError::Duplicate(title) => Self::DuplicateNote(title),
            NoteStoreError::NotFound(title) => Self::NoteNotFound(title),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Errors produced by the registry and dispatcher.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool is registered under this name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A tool with this name is already registered.
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// A required parameter was omitted.
    #[error("Missing required parameter '{parameter}' for tool '{tool}'")]
    MissingParameter { tool: String, parameter: String },

    /// A parameter has the wrong JSON type.
    #[error("Parameter '{parameter}' must be {expected}, got {found}")]
    TypeMismatch {
        parameter: String,
        expected: ParamType,
        found: &'static str,
    },

    /// A parameter has the right type but violates a constraint.
    #[error("Invalid value for parameter '{parameter}': {reason}")]
    InvalidValue { parameter: String, reason: String },

    /// An argument that the tool does not declare.
    #[error("Unexpected parameter '{parameter}' for tool '{tool}'")]
    UnexpectedParameter { tool: String, parameter: String },

    /// The tool handler ran and failed.
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// The transport could not extract a tool call from the request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ToolError {
    /// Create a new "unknown tool" error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Create a new "invalid value" error.
    pub fn invalid_value(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create a new "invalid request" error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Wire category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownTool(_) => ErrorKind::UnknownTool,
            Self::DuplicateTool(_) => ErrorKind::DuplicateTool,
            Self::MissingParameter { .. } => ErrorKind::MissingParameter,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::InvalidValue { .. } => ErrorKind::InvalidValue,
            Self::UnexpectedParameter { .. } => ErrorKind::UnexpectedParameter,
            Self::Handler(_) => ErrorKind::HandlerError,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// Handler failure kind, when this wraps a handler error.
    pub fn cause(&self) -> Option<HandlerErrorKind> {
        match self {
            Self::Handler(inner) => Some(inner.kind()),
            _ => None,
        }
    }
}
