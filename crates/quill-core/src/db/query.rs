//! Typed read queries for the quill store.
//!
//! Provides typed structs and composable query functions for the common
//! access patterns: load by id, multi-id selects, folder previews, tag
//! joins. All functions take a shared `&Connection` and return
//! `anyhow::Result<T>` with typed structs (never raw rows).
//!
//! Multi-id selects always go through generated placeholder lists and
//! `params_from_iter` — ids are never spliced into SQL text.

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, Row, params, params_from_iter};
use std::fmt;
use std::str::FromStr;

use crate::model::{Folder, Note, Resource, Tag};

const NOTE_COLUMNS: &str = "id, parent_id, title, body, is_todo, todo_due, todo_completed, \
     is_conflict, conflict_original_id, share_id, is_shared, \
     created_time, updated_time, user_created_time, user_updated_time, \
     deleted_time, trashed_at";

const FOLDER_COLUMNS: &str =
    "id, parent_id, title, share_id, is_shared, created_time, updated_time, deleted_time";

const TAG_COLUMNS: &str = "id, title, created_time, updated_time";

const RESOURCE_COLUMNS: &str = "id, title, mime, file_extension, size, share_id, is_shared, \
     created_time, updated_time";

fn row_to_note(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        is_todo: row.get(4)?,
        todo_due: row.get(5)?,
        todo_completed: row.get(6)?,
        is_conflict: row.get(7)?,
        conflict_original_id: row.get(8)?,
        share_id: row.get(9)?,
        is_shared: row.get(10)?,
        created_time: row.get(11)?,
        updated_time: row.get(12)?,
        user_created_time: row.get(13)?,
        user_updated_time: row.get(14)?,
        deleted_time: row.get(15)?,
        trashed_at: row.get(16)?,
    })
}

fn row_to_folder(row: &Row<'_>) -> rusqlite::Result<Folder> {
    Ok(Folder {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        title: row.get(2)?,
        share_id: row.get(3)?,
        is_shared: row.get(4)?,
        created_time: row.get(5)?,
        updated_time: row.get(6)?,
        deleted_time: row.get(7)?,
    })
}

fn row_to_tag(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        title: row.get(1)?,
        created_time: row.get(2)?,
        updated_time: row.get(3)?,
    })
}

fn row_to_resource(row: &Row<'_>) -> rusqlite::Result<Resource> {
    Ok(Resource {
        id: row.get(0)?,
        title: row.get(1)?,
        mime: row.get(2)?,
        file_extension: row.get(3)?,
        size: row.get(4)?,
        share_id: row.get(5)?,
        is_shared: row.get(6)?,
        created_time: row.get(7)?,
        updated_time: row.get(8)?,
    })
}

/// `?,?,?` placeholder list for an IN clause of `len` values.
pub(crate) fn placeholders(len: usize) -> String {
    let mut out = String::with_capacity(len * 2);
    for i in 0..len {
        if i > 0 {
            out.push(',');
        }
        out.push('?');
    }
    out
}

// ---------------------------------------------------------------------------
// Single-item loads
// ---------------------------------------------------------------------------

/// Fetch a single note by exact id. `None` when the row does not exist
/// (or is trashed, unless `include_deleted`).
pub fn get_note(conn: &Connection, id: &str, include_deleted: bool) -> Result<Option<Note>> {
    let sql = if include_deleted {
        format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1")
    } else {
        format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1 AND deleted_time = 0")
    };

    let mut stmt = conn.prepare(&sql).context("prepare get_note query")?;
    match stmt.query_row(params![id], row_to_note) {
        Ok(note) => Ok(Some(note)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_note for '{id}'")),
    }
}

/// Fetch a single folder by exact id.
pub fn get_folder(conn: &Connection, id: &str, include_deleted: bool) -> Result<Option<Folder>> {
    let sql = if include_deleted {
        format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE id = ?1")
    } else {
        format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE id = ?1 AND deleted_time = 0")
    };

    let mut stmt = conn.prepare(&sql).context("prepare get_folder query")?;
    match stmt.query_row(params![id], row_to_folder) {
        Ok(folder) => Ok(Some(folder)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_folder for '{id}'")),
    }
}

/// Fetch a single tag by exact id.
pub fn get_tag(conn: &Connection, id: &str) -> Result<Option<Tag>> {
    let sql = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?1");
    let mut stmt = conn.prepare(&sql).context("prepare get_tag query")?;
    match stmt.query_row(params![id], row_to_tag) {
        Ok(tag) => Ok(Some(tag)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_tag for '{id}'")),
    }
}

/// Fetch a tag by title, case-insensitively.
pub fn tag_by_title(conn: &Connection, title: &str) -> Result<Option<Tag>> {
    let sql = format!("SELECT {TAG_COLUMNS} FROM tags WHERE title = ?1 COLLATE NOCASE");
    let mut stmt = conn.prepare(&sql).context("prepare tag_by_title query")?;
    match stmt.query_row(params![title], row_to_tag) {
        Ok(tag) => Ok(Some(tag)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("tag_by_title for '{title}'")),
    }
}

/// Fetch a single resource by exact id.
pub fn get_resource(conn: &Connection, id: &str) -> Result<Option<Resource>> {
    let sql = format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = ?1");
    let mut stmt = conn.prepare(&sql).context("prepare get_resource query")?;
    match stmt.query_row(params![id], row_to_resource) {
        Ok(resource) => Ok(Some(resource)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_resource for '{id}'")),
    }
}

// ---------------------------------------------------------------------------
// Multi-item selects
// ---------------------------------------------------------------------------

/// Fetch all existing notes among `ids`. Unknown ids are silently
/// absent from the result; order is unspecified.
pub fn notes_by_ids(conn: &Connection, ids: &[String], include_deleted: bool) -> Result<Vec<Note>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut sql = format!(
        "SELECT {NOTE_COLUMNS} FROM notes WHERE id IN ({})",
        placeholders(ids.len())
    );
    if !include_deleted {
        sql.push_str(" AND deleted_time = 0");
    }

    let mut stmt = conn.prepare(&sql).context("prepare notes_by_ids query")?;
    let rows = stmt
        .query_map(params_from_iter(ids.iter()), row_to_note)
        .context("execute notes_by_ids")?;

    let mut notes = Vec::new();
    for row in rows {
        notes.push(row.context("read notes_by_ids row")?);
    }
    Ok(notes)
}

/// Fetch all existing tags among `ids`.
pub fn tags_by_ids(conn: &Connection, ids: &[String]) -> Result<Vec<Tag>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT {TAG_COLUMNS} FROM tags WHERE id IN ({}) ORDER BY title",
        placeholders(ids.len())
    );
    let mut stmt = conn.prepare(&sql).context("prepare tags_by_ids query")?;
    let rows = stmt
        .query_map(params_from_iter(ids.iter()), row_to_tag)
        .context("execute tags_by_ids")?;

    let mut tags = Vec::new();
    for row in rows {
        tags.push(row.context("read tags_by_ids row")?);
    }
    Ok(tags)
}

/// Direct child folders of `parent_id`.
pub fn child_folders(
    conn: &Connection,
    parent_id: &str,
    include_deleted: bool,
) -> Result<Vec<Folder>> {
    let sql = if include_deleted {
        format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE parent_id = ?1")
    } else {
        format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE parent_id = ?1 AND deleted_time = 0")
    };

    let mut stmt = conn.prepare(&sql).context("prepare child_folders query")?;
    let rows = stmt
        .query_map(params![parent_id], row_to_folder)
        .context("execute child_folders")?;

    let mut folders = Vec::new();
    for row in rows {
        folders.push(row.context("read child_folders row")?);
    }
    Ok(folders)
}

/// Ids of notes directly inside `folder_id`.
pub fn note_ids_in_folder(
    conn: &Connection,
    folder_id: &str,
    include_deleted: bool,
) -> Result<Vec<String>> {
    let sql = if include_deleted {
        "SELECT id FROM notes WHERE parent_id = ?1"
    } else {
        "SELECT id FROM notes WHERE parent_id = ?1 AND deleted_time = 0"
    };

    let mut stmt = conn.prepare(sql).context("prepare note_ids_in_folder")?;
    let rows = stmt
        .query_map(params![folder_id], |row| row.get::<_, String>(0))
        .context("execute note_ids_in_folder")?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row.context("read note_ids_in_folder row")?);
    }
    Ok(ids)
}

/// Titles of active notes inside `folder_id`, used for unique-title
/// generation during duplication.
pub fn note_titles_in_folder(conn: &Connection, folder_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT title FROM notes WHERE parent_id = ?1 AND deleted_time = 0")
        .context("prepare note_titles_in_folder")?;
    let rows = stmt
        .query_map(params![folder_id], |row| row.get::<_, String>(0))
        .context("execute note_titles_in_folder")?;

    let mut titles = Vec::new();
    for row in rows {
        titles.push(row.context("read note_titles_in_folder row")?);
    }
    Ok(titles)
}

// ---------------------------------------------------------------------------
// Tag joins
// ---------------------------------------------------------------------------

/// Tag ids attached to a note (regardless of the note's trash state —
/// trashing does not detach tags).
pub fn tag_ids_by_note_id(conn: &Connection, note_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT tag_id FROM note_tags WHERE note_id = ?1 ORDER BY tag_id")
        .context("prepare tag_ids_by_note_id")?;
    let rows = stmt
        .query_map(params![note_id], |row| row.get::<_, String>(0))
        .context("execute tag_ids_by_note_id")?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row.context("read tag_ids_by_note_id row")?);
    }
    Ok(ids)
}

/// Ids of active (non-trashed) notes carrying `tag_id`.
pub fn note_ids_by_tag_id(conn: &Connection, tag_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT note_tags.note_id
             FROM note_tags
             LEFT JOIN notes ON notes.id = note_tags.note_id
             WHERE note_tags.tag_id = ?1 AND notes.deleted_time = 0",
        )
        .context("prepare note_ids_by_tag_id")?;
    let rows = stmt
        .query_map(params![tag_id], |row| row.get::<_, String>(0))
        .context("execute note_ids_by_tag_id")?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row.context("read note_ids_by_tag_id row")?);
    }
    Ok(ids)
}

/// True when `tag_id` is attached to the active note `note_id`.
pub fn has_note_tag(conn: &Connection, tag_id: &str, note_id: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1
             FROM note_tags
             LEFT JOIN notes ON notes.id = note_tags.note_id
             WHERE note_tags.tag_id = ?1 AND note_tags.note_id = ?2
               AND notes.deleted_time = 0
             LIMIT 1",
            params![tag_id, note_id],
            |row| row.get(0),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })
        .context("execute has_note_tag")?;
    Ok(found.is_some())
}

// ---------------------------------------------------------------------------
// Previews
// ---------------------------------------------------------------------------

/// Sort order for folder previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewSort {
    /// Most recently user-updated first.
    #[default]
    UserUpdatedDesc,
    UserUpdatedAsc,
    UserCreatedDesc,
    UserCreatedAsc,
    /// Case-insensitive title order.
    TitleAsc,
    TitleDesc,
}

impl PreviewSort {
    // Columns are qualified because the trash-root listing joins the
    // folders table, which also has `id` and `title`.
    const fn sql_clause(self) -> &'static str {
        match self {
            Self::UserUpdatedDesc => "n.user_updated_time DESC, n.id ASC",
            Self::UserUpdatedAsc => "n.user_updated_time ASC, n.id ASC",
            Self::UserCreatedDesc => "n.user_created_time DESC, n.id ASC",
            Self::UserCreatedAsc => "n.user_created_time ASC, n.id ASC",
            Self::TitleAsc => "n.title COLLATE NOCASE ASC, n.id ASC",
            Self::TitleDesc => "n.title COLLATE NOCASE DESC, n.id ASC",
        }
    }
}

impl fmt::Display for PreviewSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserUpdatedDesc => f.write_str("user_updated_desc"),
            Self::UserUpdatedAsc => f.write_str("user_updated_asc"),
            Self::UserCreatedDesc => f.write_str("user_created_desc"),
            Self::UserCreatedAsc => f.write_str("user_created_asc"),
            Self::TitleAsc => f.write_str("title_asc"),
            Self::TitleDesc => f.write_str("title_desc"),
        }
    }
}

impl FromStr for PreviewSort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user_updated_desc" | "recent" => Ok(Self::UserUpdatedDesc),
            "user_updated_asc" | "stale" => Ok(Self::UserUpdatedAsc),
            "user_created_desc" | "newest" => Ok(Self::UserCreatedDesc),
            "user_created_asc" | "oldest" => Ok(Self::UserCreatedAsc),
            "title_asc" | "title" => Ok(Self::TitleAsc),
            "title_desc" => Ok(Self::TitleDesc),
            other => bail!(
                "unknown preview sort '{other}': expected one of user_updated_desc, \
                 user_updated_asc, user_created_desc, user_created_asc, title_asc, title_desc"
            ),
        }
    }
}

/// Listing options for folder previews.
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub sort: PreviewSort,
    /// List uncompleted todos before everything else.
    pub uncompleted_todos_on_top: bool,
    /// When false, completed todos are filtered out entirely.
    pub show_completed_todos: bool,
    pub limit: Option<u32>,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            sort: PreviewSort::default(),
            uncompleted_todos_on_top: false,
            show_completed_todos: true,
            limit: None,
        }
    }
}

/// What a preview listing ranges over. Resolution from a folder id to a
/// scope (virtual trash root, trashed folder, conflicts, plain folder)
/// is done by [`crate::notes::previews`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewScope<'a> {
    /// Active, non-conflict notes of a live folder.
    Folder(&'a str),
    /// Trashed notes whose owning folder is still live (or gone).
    TrashRoot,
    /// Trashed notes of a folder that is itself in the trash.
    TrashedFolder(&'a str),
    /// Active conflict notes.
    Conflicts,
}

/// List note previews for a scope.
pub fn list_previews(
    conn: &Connection,
    scope: PreviewScope<'_>,
    options: &PreviewOptions,
) -> Result<Vec<Note>> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut join = "";

    match scope {
        PreviewScope::Folder(folder_id) => {
            param_values.push(Box::new(folder_id.to_string()));
            conditions.push(format!("n.parent_id = ?{}", param_values.len()));
            conditions.push("n.deleted_time = 0".into());
            conditions.push("n.is_conflict = 0".into());
        }
        PreviewScope::TrashRoot => {
            join = " LEFT JOIN folders f ON f.id = n.parent_id";
            conditions.push("n.deleted_time != 0".into());
            conditions.push("(f.id IS NULL OR f.deleted_time = 0)".into());
        }
        PreviewScope::TrashedFolder(folder_id) => {
            param_values.push(Box::new(folder_id.to_string()));
            conditions.push(format!("n.parent_id = ?{}", param_values.len()));
            conditions.push("n.deleted_time != 0".into());
        }
        PreviewScope::Conflicts => {
            conditions.push("n.is_conflict = 1".into());
            conditions.push("n.deleted_time = 0".into());
        }
    }

    if !options.show_completed_todos {
        conditions.push("(n.is_todo = 0 OR n.todo_completed = 0)".into());
    }

    let columns: String = NOTE_COLUMNS
        .split(", ")
        .map(|c| format!("n.{c}"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!(
        "SELECT {columns} FROM notes n{join} WHERE {} ORDER BY ",
        conditions.join(" AND ")
    );
    if options.uncompleted_todos_on_top {
        sql.push_str("CASE WHEN n.is_todo = 1 AND n.todo_completed = 0 THEN 0 ELSE 1 END ASC, ");
    }
    sql.push_str(options.sort.sql_clause());

    if let Some(limit) = options.limit {
        param_values.push(Box::new(i64::from(limit)));
        sql.push_str(&format!(" LIMIT ?{}", param_values.len()));
    }

    let mut stmt = conn.prepare(&sql).context("prepare list_previews query")?;

    let params_ref: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(AsRef::as_ref).collect();

    let rows = stmt
        .query_map(params_from_iter(params_ref), row_to_note)
        .context("execute list_previews")?;

    let mut notes = Vec::new();
    for row in rows {
        notes.push(row.context("read list_previews row")?);
    }
    Ok(notes)
}

// ---------------------------------------------------------------------------
// Trash / retention helpers
// ---------------------------------------------------------------------------

/// Ids of all trashed notes.
pub fn trashed_note_ids(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT id FROM notes WHERE deleted_time != 0 ORDER BY id")
        .context("prepare trashed_note_ids")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("execute trashed_note_ids")?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row.context("read trashed_note_ids row")?);
    }
    Ok(ids)
}

/// Ids of all trashed folders.
pub fn trashed_folder_ids(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT id FROM folders WHERE deleted_time != 0 ORDER BY id")
        .context("prepare trashed_folder_ids")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("execute trashed_folder_ids")?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row.context("read trashed_folder_ids row")?);
    }
    Ok(ids)
}

/// Notes trashed via the trash path at or before `cutoff` (unix ms).
/// Never matches active notes or notes without trash bookkeeping.
pub fn trashed_note_ids_older_than(conn: &Connection, cutoff: i64) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT id FROM notes
             WHERE deleted_time != 0 AND trashed_at != 0 AND trashed_at <= ?1
             ORDER BY id",
        )
        .context("prepare trashed_note_ids_older_than")?;
    let rows = stmt
        .query_map(params![cutoff], |row| row.get::<_, String>(0))
        .context("execute trashed_note_ids_older_than")?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row.context("read trashed_note_ids_older_than row")?);
    }
    Ok(ids)
}

/// Number of active conflict notes.
pub fn conflicted_count(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM notes WHERE is_conflict = 1 AND deleted_time = 0",
        [],
        |row| row.get(0),
    )
    .context("execute conflicted_count")
}

/// Number of resource rows.
pub fn resource_count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM resources", [], |row| row.get(0))
        .context("execute resource_count")
}

#[cfg(test)]
mod tests {
    use super::placeholders;

    #[test]
    fn placeholder_lists() {
        assert_eq!(placeholders(0), "");
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?,?,?");
    }
}
