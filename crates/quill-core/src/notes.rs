//! Note lifecycle operations.
//!
//! Save, delete (soft and hard), duplication, conflict handling and
//! previews. Every operation takes an explicit connection and, where
//! permissions matter, a [`ShareContext`] plus a [`ChangeSource`]:
//!
//! - user-origin writes are refused on items in read-only shares
//! - sync-origin writes may update existing items in read-only shares,
//!   but may never create new children under a read-only folder
//!
//! Mutations return what changed (the saved entity, the ids trashed or
//! purged); observers that maintain in-memory views act on the returned
//! values rather than on hidden side channels.

use std::collections::HashSet;
use std::path::PathBuf;

use rusqlite::Connection;

use crate::db::query::{self, PreviewOptions, PreviewScope};
use crate::error::{Error, Result};
use crate::model::Note;
use crate::share::{ChangeSource, ShareContext};
use crate::{id, markdown, resources, store, tags, time, trash};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options for [`save`].
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Run user-facing validation (stricter than what sync imports get).
    pub user_side_validation: bool,
    pub change_source: ChangeSource,
    /// Refresh bookkeeping timestamps on save. Off only for operations
    /// that manage timestamps themselves (duplication, moves).
    pub auto_timestamp: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            user_side_validation: false,
            change_source: ChangeSource::User,
            auto_timestamp: true,
        }
    }
}

impl SaveOptions {
    /// Sync-origin save with automatic timestamps.
    #[must_use]
    pub fn sync() -> Self {
        Self {
            change_source: ChangeSource::Sync,
            ..Default::default()
        }
    }
}

/// Options for [`delete`] / [`batch_delete`].
#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    /// Soft-delete into the trash instead of purging rows.
    pub to_trash: bool,
    pub change_source: ChangeSource,
    /// Free-text provenance, for audit logging only.
    pub source_description: Option<String>,
}

impl DeleteOptions {
    /// Trash-delete with user origin.
    #[must_use]
    pub fn trash() -> Self {
        Self {
            to_trash: true,
            ..Default::default()
        }
    }
}

/// Options for [`duplicate`].
#[derive(Debug, Clone, Default)]
pub struct DuplicateOptions {
    /// Explicit title for the duplicate; when absent a unique
    /// `"<title> (<n>)"` suffix is generated within the folder.
    pub unique_title: Option<String>,
    /// Deep-copy referenced resources and point the duplicate's body at
    /// the copies.
    pub duplicate_resources: bool,
    /// Where resource files live, for copying their bytes. Metadata is
    /// still copied when unset.
    pub resource_dir: Option<PathBuf>,
}

/// What a (batch) delete actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDeleteOutcome {
    pub trashed: Vec<String>,
    pub purged: Vec<String>,
}

// ---------------------------------------------------------------------------
// Loads
// ---------------------------------------------------------------------------

/// Load a note by id, including trashed ones. Missing notes are
/// `Ok(None)` — callers use this to confirm a purge completed.
pub fn load(conn: &Connection, note_id: &str) -> Result<Option<Note>> {
    Ok(query::get_note(conn, note_id, true)?)
}

/// Number of active conflict notes.
pub fn conflicted_count(conn: &Connection) -> Result<i64> {
    Ok(query::conflicted_count(conn)?)
}

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

/// Refuse any attempt to file a note under a virtual folder.
fn ensure_not_virtual_target(folder_id: &str) -> Result<()> {
    if folder_id == trash::conflict_folder_id() {
        return Err(Error::VirtualFolderTarget(trash::conflict_folder_title()));
    }
    if folder_id == trash::trash_folder_id() {
        return Err(Error::VirtualFolderTarget(trash::trash_folder_title()));
    }
    Ok(())
}

/// Creation under a read-only folder is refused for every change
/// source: sync may update existing notes in a read-only share but may
/// not invent new children for it.
fn ensure_parent_writable(conn: &Connection, ctx: &ShareContext, folder_id: &str) -> Result<()> {
    if folder_id.is_empty() {
        return Ok(());
    }
    if let Some(folder) = query::get_folder(conn, folder_id, true)? {
        if ctx.is_read_only(&folder.share_id) {
            return Err(Error::IsReadOnly {
                share_id: folder.share_id,
            });
        }
    }
    Ok(())
}

/// Save a note: insert when the id is empty or unknown, update
/// otherwise. Returns the stored entity with bookkeeping timestamps
/// populated.
pub fn save(
    conn: &Connection,
    ctx: &ShareContext,
    mut note: Note,
    options: &SaveOptions,
) -> Result<Note> {
    let existing = if note.id.is_empty() {
        None
    } else {
        query::get_note(conn, &note.id, true)?
    };
    let now = time::now_ms();

    match existing {
        None => {
            ensure_not_virtual_target(&note.parent_id)?;
            ensure_parent_writable(conn, ctx, &note.parent_id)?;

            if note.id.is_empty() {
                note.id = id::generate();
            } else if !id::is_valid(&note.id) {
                return Err(Error::Validation(format!(
                    "invalid note id '{}'",
                    note.id
                )));
            }

            if options.user_side_validation && note.is_conflict {
                return Err(Error::Validation(
                    "conflict notes cannot be created directly".into(),
                ));
            }

            if options.auto_timestamp {
                if note.created_time == 0 {
                    note.created_time = now;
                }
                if note.user_created_time == 0 {
                    note.user_created_time = note.created_time;
                }
                note.updated_time = now;
                note.user_updated_time = now;
            }

            store::insert_note(conn, &note)?;
            tracing::debug!(note_id = %note.id, "created note");
        }
        Some(stored) => {
            if !options.change_source.is_sync() && ctx.is_read_only(&stored.share_id) {
                return Err(Error::IsReadOnly {
                    share_id: stored.share_id,
                });
            }

            if note.parent_id != stored.parent_id {
                ensure_not_virtual_target(&note.parent_id)?;
                if !options.change_source.is_sync() {
                    ensure_parent_writable(conn, ctx, &note.parent_id)?;
                }
            }

            if note.created_time == 0 {
                note.created_time = stored.created_time;
            }
            if note.user_created_time == 0 {
                note.user_created_time = stored.user_created_time;
            }
            if options.auto_timestamp {
                note.updated_time = now;
                note.user_updated_time = now;
            }

            store::update_note(conn, &note)?;
            tracing::debug!(note_id = %note.id, "updated note");
        }
    }

    Ok(note)
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Delete a batch of notes, to the trash or permanently.
///
/// An empty id list is a no-op, and ids that match no row are skipped —
/// a sweep racing a manual purge must not fail. The whole batch is
/// checked against read-only shares before anything is touched.
pub fn batch_delete(
    conn: &Connection,
    ctx: &ShareContext,
    note_ids: &[String],
    options: &DeleteOptions,
) -> Result<BatchDeleteOutcome> {
    if note_ids.is_empty() {
        return Ok(BatchDeleteOutcome::default());
    }

    let notes = query::notes_by_ids(conn, note_ids, true)?;

    if !options.change_source.is_sync() {
        for note in &notes {
            if ctx.is_read_only(&note.share_id) {
                return Err(Error::IsReadOnly {
                    share_id: note.share_id.clone(),
                });
            }
        }
    }

    let found: Vec<String> = notes.into_iter().map(|n| n.id).collect();
    let now = time::now_ms();

    let mut outcome = BatchDeleteOutcome::default();
    if options.to_trash {
        store::soft_delete_notes(conn, &found, now)?;
        outcome.trashed = found;
    } else {
        store::hard_delete_notes(conn, &found)?;
        outcome.purged = found;
    }

    tracing::debug!(
        trashed = outcome.trashed.len(),
        purged = outcome.purged.len(),
        source = options.source_description.as_deref().unwrap_or("unspecified"),
        "deleted notes"
    );
    Ok(outcome)
}

/// Single-note convenience wrapper around [`batch_delete`].
pub fn delete(
    conn: &Connection,
    ctx: &ShareContext,
    note_id: &str,
    options: &DeleteOptions,
) -> Result<BatchDeleteOutcome> {
    batch_delete(conn, ctx, &[note_id.to_string()], options)
}

// ---------------------------------------------------------------------------
// Duplication / copy / move
// ---------------------------------------------------------------------------

/// Smallest `"<base> (<n>)"` not already used by an active note in the
/// folder.
fn unique_note_title(conn: &Connection, folder_id: &str, base: &str) -> Result<String> {
    let taken: HashSet<String> = query::note_titles_in_folder(conn, folder_id)?
        .into_iter()
        .collect();

    let mut n: u32 = 1;
    loop {
        let candidate = format!("{base} ({n})");
        if !taken.contains(&candidate) {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Insert a copy of `src` with a fresh identity. All four timestamps
/// are guaranteed to differ from the source, so the copy can never be
/// mistaken for the original on a recency sort. Tags of the source are
/// re-attached to the copy (shared, not duplicated).
fn clone_with_new_identity(
    conn: &Connection,
    ctx: &ShareContext,
    src: &Note,
    title: String,
    parent_id: String,
    body: String,
) -> Result<Note> {
    ensure_not_virtual_target(&parent_id)?;
    ensure_parent_writable(conn, ctx, &parent_id)?;

    let now = time::now_ms();
    let mut copy = src.clone();
    copy.id = id::generate();
    copy.title = title;
    copy.parent_id = parent_id;
    copy.body = body;
    copy.is_conflict = false;
    copy.conflict_original_id.clear();
    copy.deleted_time = 0;
    copy.trashed_at = 0;
    copy.created_time = time::bump_past(now, src.created_time);
    copy.updated_time = time::bump_past(now, src.updated_time);
    copy.user_created_time = time::bump_past(now, src.user_created_time);
    copy.user_updated_time = time::bump_past(now, src.user_updated_time);

    store::insert_note(conn, &copy)?;

    for tag_id in query::tag_ids_by_note_id(conn, &src.id)? {
        tags::add_note(conn, &tag_id, &copy.id)?;
    }

    Ok(copy)
}

/// Duplicate a note within its folder.
pub fn duplicate(
    conn: &Connection,
    ctx: &ShareContext,
    note_id: &str,
    options: &DuplicateOptions,
) -> Result<Note> {
    let src = load(conn, note_id)?
        .ok_or_else(|| Error::Validation(format!("no such note: '{note_id}'")))?;

    let title = match &options.unique_title {
        Some(title) => title.clone(),
        None => unique_note_title(conn, &src.parent_id, &src.title)?,
    };

    let mut body = src.body.clone();
    if options.duplicate_resources {
        for linked_id in markdown::linked_item_ids(&src.body) {
            if query::get_resource(conn, &linked_id)?.is_none() {
                continue;
            }
            let copy =
                resources::deep_copy(conn, options.resource_dir.as_deref(), &linked_id)?;
            body = replace_internal_link(&body, &linked_id, &copy.id)?;
        }
    }

    let duplicated =
        clone_with_new_identity(conn, ctx, &src, title, src.parent_id.clone(), body)?;
    tracing::debug!(src = %src.id, dup = %duplicated.id, "duplicated note");
    Ok(duplicated)
}

/// Rewrite every `:/old` occurrence (case-insensitive) to `:/new`.
fn replace_internal_link(body: &str, old_id: &str, new_id: &str) -> Result<String> {
    let pattern = format!("(?i):/{}", regex::escape(old_id));
    let re = regex::Regex::new(&pattern)
        .map_err(|_| Error::Unreachable("scanner ids always form a valid pattern"))?;
    Ok(re.replace_all(body, format!(":/{new_id}")).into_owned())
}

/// Copy a note into another folder. The copy drops any conflict state —
/// copying a conflict note out of the Conflicts view is how a conflict
/// is resolved by keeping both versions.
pub fn copy_to_folder(
    conn: &Connection,
    ctx: &ShareContext,
    note_id: &str,
    folder_id: &str,
) -> Result<Note> {
    ensure_not_virtual_target(folder_id)?;

    let src = load(conn, note_id)?
        .ok_or_else(|| Error::Validation(format!("no such note: '{note_id}'")))?;

    clone_with_new_identity(
        conn,
        ctx,
        &src,
        src.title.clone(),
        folder_id.to_string(),
        src.body.clone(),
    )
}

/// Move a note into another folder, in place. Clears any conflict
/// state, like [`copy_to_folder`]. `updated_time` is refreshed but the
/// user timestamp is not — a move is not a content edit.
pub fn move_to_folder(
    conn: &Connection,
    ctx: &ShareContext,
    note_id: &str,
    folder_id: &str,
) -> Result<Note> {
    ensure_not_virtual_target(folder_id)?;

    let mut note = load(conn, note_id)?
        .ok_or_else(|| Error::Validation(format!("no such note: '{note_id}'")))?;

    if ctx.is_read_only(&note.share_id) {
        return Err(Error::IsReadOnly {
            share_id: note.share_id,
        });
    }
    ensure_parent_writable(conn, ctx, folder_id)?;

    note.parent_id = folder_id.to_string();
    note.is_conflict = false;
    note.conflict_original_id.clear();
    note.updated_time = time::now_ms();

    store::update_note(conn, &note)?;
    Ok(note)
}

// ---------------------------------------------------------------------------
// Conflicts
// ---------------------------------------------------------------------------

/// Create the conflict copy for a divergent edit detected by sync.
///
/// The copy keeps the original's content and folder but gets a fresh
/// identity, `is_conflict` set, a back-reference to the original, and
/// cleared share fields — conflict notes are never shared. The original
/// is not touched; this is the sole path by which divergent edits are
/// surfaced instead of silently overwriting one side.
pub fn create_conflict_note(
    conn: &Connection,
    original: &Note,
    change_source: ChangeSource,
) -> Result<Note> {
    let now = time::now_ms();
    let mut conflict = original.clone();
    conflict.id = id::generate();
    conflict.is_conflict = true;
    conflict.conflict_original_id = original.id.clone();
    conflict.share_id.clear();
    conflict.is_shared = false;
    conflict.deleted_time = 0;
    conflict.trashed_at = 0;
    conflict.created_time = now;
    conflict.updated_time = now;

    store::insert_note(conn, &conflict)?;
    tracing::debug!(
        original = %original.id,
        conflict = %conflict.id,
        sync_origin = change_source.is_sync(),
        "created conflict note"
    );
    Ok(conflict)
}

// ---------------------------------------------------------------------------
// Previews
// ---------------------------------------------------------------------------

/// List the notes displayed for a folder id, which may be a real
/// folder, the virtual trash root, a trashed folder (a subfolder of the
/// trash view), or the virtual conflicts folder.
pub fn previews(
    conn: &Connection,
    folder_id: &str,
    options: &PreviewOptions,
) -> Result<Vec<Note>> {
    let scope = if folder_id == trash::trash_folder_id() {
        PreviewScope::TrashRoot
    } else if folder_id == trash::conflict_folder_id() {
        PreviewScope::Conflicts
    } else {
        match query::get_folder(conn, folder_id, true)? {
            Some(folder) if folder.is_trashed() => PreviewScope::TrashedFolder(folder_id),
            _ => PreviewScope::Folder(folder_id),
        }
    };

    Ok(query::list_previews(conn, scope, options)?)
}
