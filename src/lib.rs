//! Utility MCP Server Library
//!
//! This crate provides a Model Context Protocol (MCP) server exposing a set
//! of everyday utilities: a safe calculator, text transforms, hashing,
//! Base64 and JSON helpers, UUID generation, system information and a small
//! persistent note store.
//!
//! # Architecture
//!
//! The server is organized into the following modules:
//!
//! - **core**: Core infrastructure including configuration, error handling, and the main server
//! - **domains**: Business logic organized by bounded contexts
//!   - **notes**: Note model and storage backends
//!   - **tools**: Tool registry, argument validation and the dispatcher
//!   - **resources**: Read-only views over notes and server metadata
//!
//! # Example
//!
//! ```rust,no_run
//! use utility_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
