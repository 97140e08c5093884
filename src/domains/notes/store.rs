//! Note store abstraction.

use std::path::PathBuf;
use thiserror::Error;

use super::model::Note;

/// Errors raised by note store backends.
#[derive(Debug, Error)]
pub enum NoteStoreError {
    /// A note with this title already exists.
    #[error("Note '{0}' already exists")]
    Duplicate(String),

    /// No note has this title.
    #[error("Note '{0}' not found")]
    NotFound(String),

    /// Reading or writing the backing file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a valid note map.
    #[error("Corrupt note file {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A writer panicked while holding the store lock.
    #[error("Note store lock poisoned")]
    Poisoned,
}

impl NoteStoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Keyed note collection shared by the note tools.
///
/// Implementations must make `put` an atomic check-and-insert: of several
/// concurrent `put` calls with the same title exactly one succeeds and the
/// others get [`NoteStoreError::Duplicate`]. `get` and `list` must observe a
/// complete snapshot, never a half-written state.
pub trait NoteStore: Send + Sync {
    /// Fetch a note by title.
    fn get(&self, title: &str) -> Result<Option<Note>, NoteStoreError>;

    /// Insert a new note, failing if the title is taken.
    fn put(&self, note: Note) -> Result<(), NoteStoreError>;

    /// All notes, ordered by title.
    fn list(&self) -> Result<Vec<Note>, NoteStoreError>;

    /// Remove a note and return it.
    fn delete(&self, title: &str) -> Result<Note, NoteStoreError>;
}
