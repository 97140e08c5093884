//! Resource definitions module.
//!
//! Each resource is defined in its own file with:
//! - URI and metadata
//! - A reader producing its JSON content
//!
//! ## Adding a New Resource
//!
//! 1. Create a new file (e.g., `my_resource.rs`)
//! 2. Implement the `ResourceDefinition` trait
//! 3. Export it here
//! 4. Register in `registry.rs`

use serde_json::Value;

use super::error::ResourceError;
use super::service::ResourceContext;

pub mod notes;
pub mod server_info;

pub use notes::NotesResource;
pub use server_info::ServerInfoResource;

/// URI scheme shared by every resource of this server.
pub const URI_SCHEME: &str = "utility://";

/// Trait for resource definitions.
///
/// Each resource must implement this trait to provide its metadata and content.
pub trait ResourceDefinition {
    /// The unique URI of the resource.
    const URI: &'static str;

    /// The display name of the resource.
    const NAME: &'static str;

    /// A description of the resource.
    const DESCRIPTION: &'static str;

    /// The MIME type of the resource content.
    const MIME_TYPE: &'static str;

    /// Produce the current content.
    fn read(ctx: &ResourceContext) -> Result<Value, ResourceError>;
}
