//! Persisted model types.

pub mod folder;
pub mod note;
pub mod resource;
pub mod tag;

pub use folder::Folder;
pub use note::{Note, NoteType, NoteTypeChange, change_note_type};
pub use resource::Resource;
pub use tag::{NoteTag, Tag};
