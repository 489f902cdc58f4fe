//! quill-core: the data layer of a local-first note store.
//!
//! Owns the note/folder/tag lifecycle over a SQLite backing store:
//! soft-delete into a virtual Trash with retention-based purging,
//! sync-conflict surfacing through a virtual Conflicts view, read-only
//! share enforcement at the model layer, and an FTS5 search index kept
//! consistent with deletions.
//!
//! # Conventions
//!
//! - **Errors**: domain failures are typed ([`error::Error`]); db-layer
//!   helpers use `anyhow::Result` with context and are wrapped
//!   transparently.
//! - **Logging**: `tracing` macros with structured fields.
//! - **Permissions**: every mutating operation takes an explicit
//!   [`share::ShareContext`] and change source; there is no ambient
//!   state.

pub mod config;
pub mod db;
pub mod error;
pub mod folders;
pub mod id;
pub mod markdown;
pub mod model;
pub mod notes;
pub mod resources;
pub mod retention;
pub mod share;
mod store;
pub mod tags;
pub mod time;
pub mod trash;

pub use error::{Error, ErrorCode, Result};
pub use model::{Folder, Note, NoteType, Resource, Tag};
pub use share::{ChangeSource, ShareContext};
