//! All-notes resource definition.

use serde_json::{Value, json};

use super::ResourceDefinition;
use crate::domains::resources::error::ResourceError;
use crate::domains::resources::service::ResourceContext;

/// Every stored note, in title order.
pub struct NotesResource;

impl ResourceDefinition for NotesResource {
    const URI: &'static str = "utility://notes";
    const NAME: &'static str = "All Notes";
    const DESCRIPTION: &'static str = "All saved notes with their full content";
    const MIME_TYPE: &'static str = "application/json";

    fn read(ctx: &ResourceContext) -> Result<Value, ResourceError> {
        let notes = ctx.notes().list()?;
        Ok(json!({ "count": notes.len(), "notes": notes }))
    }
}
