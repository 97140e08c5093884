//! JSON file note store.
//!
//! The whole collection lives in one pretty-printed JSON object mapping
//! title to `{content, created_at}`. Every mutation rewrites the file through
//! a temporary sibling that is renamed over the target, so a crash mid-write
//! leaves the previous version intact and readers never see a truncated file.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::model::{Note, NoteRecord};
use super::store::{NoteStore, NoteStoreError};

type NoteMap = BTreeMap<String, NoteRecord>;

/// Note store persisted to a single JSON file.
pub struct FileNoteStore {
    path: PathBuf,

    /// Serializes read-modify-write cycles of `put` and `delete`.
    write_lock: Mutex<()>,
}

impl FileNoteStore {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("Using note file {}", path.display());
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<NoteMap, NoteStoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(NoteMap::new()),
            Err(e) => return Err(NoteStoreError::io(&self.path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(NoteMap::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| NoteStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, notes: &NoteMap) -> Result<(), NoteStoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| NoteStoreError::io(dir, e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| NoteStoreError::io(dir, e))?;
        serde_json::to_writer_pretty(&mut tmp, notes)
            .map_err(|e| NoteStoreError::io(tmp.path(), std::io::Error::other(e)))?;
        tmp.write_all(b"\n")
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| NoteStoreError::io(tmp.path(), e))?;

        tmp.persist(&self.path)
            .map_err(|e| NoteStoreError::io(&self.path, e.error))?;

        debug!("Wrote {} notes to {}", notes.len(), self.path.display());
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, NoteStoreError> {
        self.write_lock.lock().map_err(|_| NoteStoreError::Poisoned)
    }
}

impl NoteStore for FileNoteStore {
    fn get(&self, title: &str) -> Result<Option<Note>, NoteStoreError> {
        let mut notes = self.load()?;
        Ok(notes
            .remove_entry(title)
            .map(|(title, record)| Note::from_record(title, record)))
    }

    fn put(&self, note: Note) -> Result<(), NoteStoreError> {
        let _guard = self.lock()?;
        let mut notes = self.load()?;
        if notes.contains_key(&note.title) {
            return Err(NoteStoreError::Duplicate(note.title));
        }
        let (title, record) = note.into_record();
        notes.insert(title, record);
        self.save(&notes)
    }

    fn list(&self) -> Result<Vec<Note>, NoteStoreError> {
        Ok(self
            .load()?
            .into_iter()
            .map(|(title, record)| Note::from_record(title, record))
            .collect())
    }

    fn delete(&self, title: &str) -> Result<Note, NoteStoreError> {
        let _guard = self.lock()?;
        let mut notes = self.load()?;
        let (title, record) = notes
            .remove_entry(title)
            .ok_or_else(|| NoteStoreError::NotFound(title.to_string()))?;
        self.save(&notes)?;
        Ok(Note::from_record(title, record))
    }
}
