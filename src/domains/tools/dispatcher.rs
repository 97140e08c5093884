//! Tool dispatcher.
//!
//! Turns a [`ToolRequest`] into a [`ToolResponse`]: look up the tool,
//! validate the arguments, run the handler, and fold every outcome into the
//! uniform response envelope. Nothing a handler does can escape as anything
//! other than a `failure` envelope.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, instrument, warn};

use super::error::{ErrorKind, HandlerError, HandlerErrorKind, ToolError};
use super::registry::{ToolContext, ToolRegistry};
use crate::domains::notes::NoteStore;

/// A single tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRequest {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolRequest {
    /// Create a request.
    pub fn new(tool_name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Description of a failed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    /// Tool-specific failure when `kind` is `HandlerError`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<HandlerErrorKind>,
    pub message: String,
}

impl From<&ToolError> for ErrorInfo {
    fn from(err: &ToolError) -> Self {
        Self {
            kind: err.kind(),
            cause: err.cause(),
            message: err.to_string(),
        }
    }
}

/// Result envelope returned to transports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolResponse {
    Success { payload: Value },
    Failure { error: ErrorInfo },
}

impl ToolResponse {
    /// Wrap a successful result.
    pub fn success(payload: Value) -> Self {
        Self::Success { payload }
    }

    /// Wrap an error.
    pub fn failure(err: &ToolError) -> Self {
        Self::Failure { error: err.into() }
    }

    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The success payload.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success { payload } => Some(payload),
            Self::Failure { .. } => None,
        }
    }

    /// The failure details.
    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }
}

/// Validates requests against the registry and invokes handlers.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    context: ToolContext,
}

impl Dispatcher {
    /// Create a dispatcher over a registry, injecting the note store.
    pub fn new(registry: Arc<ToolRegistry>, notes: Arc<dyn NoteStore>) -> Self {
        Self {
            registry,
            context: ToolContext::new(notes),
        }
    }

    /// The registry this dispatcher serves.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute a tool call.
    #[instrument(skip_all, fields(tool = %request.tool_name))]
    pub fn dispatch(&self, request: ToolRequest) -> ToolResponse {
        info!("Dispatching tool call: {}", request.tool_name);

        match self.try_dispatch(&request) {
            Ok(payload) => ToolResponse::success(payload),
            Err(err) => {
                warn!("Tool '{}' failed: {}", request.tool_name, err);
                ToolResponse::failure(&err)
            }
        }
    }

    /// Run [`dispatch`](Self::dispatch) on tokio's blocking pool.
    ///
    /// Handlers do synchronous file I/O, so async transports call this
    /// instead. A handler that panics yields an `Internal` failure.
    pub async fn dispatch_blocking(&self, request: ToolRequest) -> ToolResponse {
        let dispatcher = self.clone();
        let tool_name = request.tool_name.clone();
        match tokio::task::spawn_blocking(move || dispatcher.dispatch(request)).await {
            Ok(response) => response,
            Err(e) => {
                error!("Tool '{}' aborted: {}", tool_name, e);
                ToolResponse::failure(&ToolError::from(HandlerError::internal(format!(
                    "tool '{tool_name}' aborted: {e}"
                ))))
            }
        }
    }

    /// Shorthand for [`dispatch`](Self::dispatch) with a name and arguments.
    pub fn call(&self, tool_name: &str, arguments: Map<String, Value>) -> ToolResponse {
        self.dispatch(ToolRequest::new(tool_name, arguments))
    }

    fn try_dispatch(&self, request: &ToolRequest) -> Result<Value, ToolError> {
        let (spec, handler) = self.registry.resolve(&request.tool_name)?;
        let args = spec.validate(&request.arguments)?;
        Ok(handler(&self.context, &args)?)
    }
}
