//! Note tools: create, list, read and delete.
//!
//! All four operate on the [`NoteStore`](crate::domains::notes::NoteStore)
//! injected through the [`ToolContext`]. Titles are trimmed before use.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use super::ToolDefinition;
use crate::domains::notes::Note;
use crate::domains::tools::error::HandlerError;
use crate::domains::tools::registry::ToolContext;
use crate::domains::tools::schema::{ParameterSpec, ValidatedArgs};

/// Characters of content shown per note by `note_list`.
pub const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
struct TitleParams {
    title: String,
}

#[derive(Debug, Deserialize)]
struct CreateParams {
    title: String,
    content: String,
}

fn clean_title(raw: &str) -> Result<String, HandlerError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(HandlerError::invalid_input("note title must not be blank"));
    }
    Ok(title.to_string())
}

fn title_parameter() -> ParameterSpec {
    ParameterSpec::string("title", "Title of the note").required()
}

// ============================================================================
// note_create
// ============================================================================

/// Create a note; fails if the title is taken.
pub struct NoteCreateTool;

impl ToolDefinition for NoteCreateTool {
    const NAME: &'static str = "note_create";

    const DESCRIPTION: &'static str = "Create a new note with a title and content. Notes are persisted across sessions.";

    fn parameters() -> Vec<ParameterSpec> {
        vec![
            title_parameter(),
            ParameterSpec::string("content", "Content of the note").required(),
        ]
    }

    #[instrument(skip_all)]
    fn handle(ctx: &ToolContext, args: &ValidatedArgs) -> Result<Value, HandlerError> {
        let params: CreateParams = args.decode()?;
        let note = Note::new(clean_title(&params.title)?, params.content);
        let title = note.title.clone();
        let created_at = note.created_at;

        ctx.notes().put(note)?;
        info!("Created note '{}'", title);

        Ok(json!({
            "title": title,
            "created_at": created_at,
            "message": format!("Note '{title}' saved successfully"),
        }))
    }
}

// ============================================================================
// note_list
// ============================================================================

/// List every note with a short preview.
pub struct NoteListTool;

impl ToolDefinition for NoteListTool {
    const NAME: &'static str = "note_list";

    const DESCRIPTION: &'static str = "List all saved notes with a preview of their content.";

    fn parameters() -> Vec<ParameterSpec> {
        Vec::new()
    }

    #[instrument(skip_all)]
    fn handle(ctx: &ToolContext, _args: &ValidatedArgs) -> Result<Value, HandlerError> {
        let notes: Vec<Value> = ctx
            .notes()
            .list()?
            .iter()
            .map(|note| {
                json!({
                    "title": note.title,
                    "created_at": note.created_at,
                    "preview": note.preview(PREVIEW_CHARS),
                })
            })
            .collect();

        Ok(json!({ "count": notes.len(), "notes": notes }))
    }
}

// ============================================================================
// note_read
// ============================================================================

/// Read one note by title.
pub struct NoteReadTool;

impl ToolDefinition for NoteReadTool {
    const NAME: &'static str = "note_read";

    const DESCRIPTION: &'static str = "Read a specific note by its title.";

    fn parameters() -> Vec<ParameterSpec> {
        vec![title_parameter()]
    }

    #[instrument(skip_all)]
    fn handle(ctx: &ToolContext, args: &ValidatedArgs) -> Result<Value, HandlerError> {
        let params: TitleParams = args.decode()?;
        let title = clean_title(&params.title)?;
        let note = ctx
            .notes()
            .get(&title)?
            .ok_or(HandlerError::NoteNotFound(title))?;

        Ok(json!({
            "title": note.title,
            "content": note.content,
            "created_at": note.created_at,
        }))
    }
}

// ============================================================================
// note_delete
// ============================================================================

/// Delete one note by title.
pub struct NoteDeleteTool;

impl ToolDefinition for NoteDeleteTool {
    const NAME: &'static str = "note_delete";

    const DESCRIPTION: &'static str = "Delete a note by its title.";

    fn parameters() -> Vec<ParameterSpec> {
        vec![title_parameter()]
    }

    #[instrument(skip_all)]
    fn handle(ctx: &ToolContext, args: &ValidatedArgs) -> Result<Value, HandlerError> {
        let params: TitleParams = args.decode()?;
        let removed = ctx.notes().delete(&clean_title(&params.title)?)?;
        info!("Deleted note '{}'", removed.title);

        Ok(json!({
            "title": removed.title,
            "message": format!("Note '{}' deleted successfully", removed.title),
        }))
    }
}
