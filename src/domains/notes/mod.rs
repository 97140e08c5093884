//! Notes domain module.
//!
//! Notes are the only persisted state of the server. Tools never touch the
//! file system directly; they receive a [`NoteStore`] through the tool
//! context, so the storage backend is chosen once at startup.
//!
//! ## Architecture
//!
//! - `model.rs` - The `Note` entity and its on-disk record
//! - `store.rs` - The `NoteStore` trait and its error type
//! - `file.rs` - JSON file backend with atomic replace-on-write
//! - `memory.rs` - In-process backend (tests, ephemeral sessions)

mod file;
mod memory;
mod model;
mod store;

pub use file::FileNoteStore;
pub use memory::MemoryNoteStore;
pub use model::Note;
pub use store::{NoteStore, NoteStoreError};
