//! Note entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A titled piece of text persisted by the note store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique key of the note.
    pub title: String,

    /// Free-form body.
    pub content: String,

    /// When the note was first created.
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Create a note stamped with the current time.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// First `max_chars` characters of the content, with `...` appended when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }

    pub(crate) fn into_record(self) -> (String, NoteRecord) {
        (
            self.title,
            NoteRecord {
                content: self.content,
                created_at: self.created_at,
            },
        )
    }

    pub(crate) fn from_record(title: String, record: NoteRecord) -> Self {
        Self {
            title,
            content: record.content,
            created_at: record.created_at,
        }
    }
}

/// Stored form of a note; the title is the key of the enclosing map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct NoteRecord {
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_content_untouched() {
        let note = Note::new("t", "short");
        assert_eq!(note.preview(50), "short");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let note = Note::new("t", "héllo wörld");
        assert_eq!(note.preview(5), "héllo...");
    }

    #[test]
    fn test_record_round_trip_keeps_fields() {
        let note = Note::new("title", "body");
        let (key, record) = note.clone().into_record();
        assert_eq!(Note::from_record(key, record), note);
    }
}
