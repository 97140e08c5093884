//! Domains module containing business logic organized by bounded contexts.
//!
//! Each subdomain represents a specific area of functionality within the MCP
//! server: note persistence, the tool catalog and dispatcher, and the
//! read-only resources built on top of both.

pub mod notes;
pub mod resources;
pub mod tools;
