//! In-memory note store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::model::Note;
use super::store::{NoteStore, NoteStoreError};

/// Note store that keeps everything in process memory.
///
/// Used when persistence is disabled and by tests that do not care about the
/// file format.
#[derive(Default)]
pub struct MemoryNoteStore {
    notes: RwLock<BTreeMap<String, Note>>,
}

impl MemoryNoteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoteStore for MemoryNoteStore {
    fn get(&self, title: &str) -> Result<Option<Note>, NoteStoreError> {
        let notes = self.notes.read().map_err(|_| NoteStoreError::Poisoned)?;
        Ok(notes.get(title).cloned())
    }

    fn put(&self, note: Note) -> Result<(), NoteStoreError> {
        let mut notes = self.notes.write().map_err(|_| NoteStoreError::Poisoned)?;
        if notes.contains_key(&note.title) {
            return Err(NoteStoreError::Duplicate(note.title));
        }
        notes.insert(note.title.clone(), note);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Note>, NoteStoreError> {
        let notes = self.notes.read().map_err(|_| NoteStoreError::Poisoned)?;
        Ok(notes.values().cloned().collect())
    }

    fn delete(&self, title: &str) -> Result<Note, NoteStoreError> {
        let mut notes = self.notes.write().map_err(|_| NoteStoreError::Poisoned)?;
        notes
            .remove(title)
            .ok_or_else(|| NoteStoreError::NotFound(title.to_string()))
    }
}
