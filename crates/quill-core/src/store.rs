//! Write primitives for the quill store.
//!
//! Every mutation in the crate funnels through these functions, which
//! serialize access to the backing SQLite store and own the
//! `created_time`/`updated_time`/`deleted_time` bookkeeping. Multi-id
//! deletes take parameterized id lists — ids are never spliced into the
//! SQL text.

use anyhow::{Context, Result};
use rusqlite::{Connection, params, params_from_iter};

use crate::db::query::placeholders;
use crate::model::{Folder, Note, NoteTag, Resource, Tag};

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

pub(crate) fn insert_note(conn: &Connection, note: &Note) -> Result<()> {
    conn.execute(
        "INSERT INTO notes (id, parent_id, title, body, is_todo, todo_due, todo_completed,
         is_conflict, conflict_original_id, share_id, is_shared,
         created_time, updated_time, user_created_time, user_updated_time,
         deleted_time, trashed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            note.id,
            note.parent_id,
            note.title,
            note.body,
            note.is_todo,
            note.todo_due,
            note.todo_completed,
            note.is_conflict,
            note.conflict_original_id,
            note.share_id,
            note.is_shared,
            note.created_time,
            note.updated_time,
            note.user_created_time,
            note.user_updated_time,
            note.deleted_time,
            note.trashed_at,
        ],
    )
    .with_context(|| format!("insert note '{}'", note.id))?;
    Ok(())
}

pub(crate) fn update_note(conn: &Connection, note: &Note) -> Result<()> {
    conn.execute(
        "UPDATE notes SET parent_id = ?2, title = ?3, body = ?4, is_todo = ?5,
         todo_due = ?6, todo_completed = ?7, is_conflict = ?8,
         conflict_original_id = ?9, share_id = ?10, is_shared = ?11,
         created_time = ?12, updated_time = ?13, user_created_time = ?14,
         user_updated_time = ?15, deleted_time = ?16, trashed_at = ?17
         WHERE id = ?1",
        params![
            note.id,
            note.parent_id,
            note.title,
            note.body,
            note.is_todo,
            note.todo_due,
            note.todo_completed,
            note.is_conflict,
            note.conflict_original_id,
            note.share_id,
            note.is_shared,
            note.created_time,
            note.updated_time,
            note.user_created_time,
            note.user_updated_time,
            note.deleted_time,
            note.trashed_at,
        ],
    )
    .with_context(|| format!("update note '{}'", note.id))?;
    Ok(())
}

/// Move notes to the trash: stamp `deleted_time`, `trashed_at` and
/// `updated_time` with the same instant and clear conflict flags, so a
/// trashed conflict leaves the Conflicts view. Rows stay in place.
pub(crate) fn soft_delete_notes(conn: &Connection, ids: &[String], now: i64) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "UPDATE notes SET deleted_time = ?1, trashed_at = ?1, updated_time = ?1,
         is_conflict = 0, conflict_original_id = ''
         WHERE id IN ({})",
        placeholders(ids.len())
    );
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(now)];
    for id in ids {
        values.push(Box::new(id.clone()));
    }
    let params_ref: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(AsRef::as_ref).collect();

    let changed = conn
        .execute(&sql, params_from_iter(params_ref))
        .context("soft-delete notes")?;
    Ok(changed)
}

/// Permanently remove note rows and their tag associations. The FTS
/// index follows via triggers.
pub(crate) fn hard_delete_notes(conn: &Connection, ids: &[String]) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let list = placeholders(ids.len());

    conn.execute(
        &format!("DELETE FROM note_tags WHERE note_id IN ({list})"),
        params_from_iter(ids.iter()),
    )
    .context("delete note tag associations")?;

    let changed = conn
        .execute(
            &format!("DELETE FROM notes WHERE id IN ({list})"),
            params_from_iter(ids.iter()),
        )
        .context("hard-delete notes")?;
    Ok(changed)
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

pub(crate) fn insert_folder(conn: &Connection, folder: &Folder) -> Result<()> {
    conn.execute(
        "INSERT INTO folders (id, parent_id, title, share_id, is_shared,
         created_time, updated_time, deleted_time)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            folder.id,
            folder.parent_id,
            folder.title,
            folder.share_id,
            folder.is_shared,
            folder.created_time,
            folder.updated_time,
            folder.deleted_time,
        ],
    )
    .with_context(|| format!("insert folder '{}'", folder.id))?;
    Ok(())
}

pub(crate) fn update_folder(conn: &Connection, folder: &Folder) -> Result<()> {
    conn.execute(
        "UPDATE folders SET parent_id = ?2, title = ?3, share_id = ?4, is_shared = ?5,
         created_time = ?6, updated_time = ?7, deleted_time = ?8
         WHERE id = ?1",
        params![
            folder.id,
            folder.parent_id,
            folder.title,
            folder.share_id,
            folder.is_shared,
            folder.created_time,
            folder.updated_time,
            folder.deleted_time,
        ],
    )
    .with_context(|| format!("update folder '{}'", folder.id))?;
    Ok(())
}

pub(crate) fn soft_delete_folders(conn: &Connection, ids: &[String], now: i64) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "UPDATE folders SET deleted_time = ?1, updated_time = ?1 WHERE id IN ({})",
        placeholders(ids.len())
    );
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(now)];
    for id in ids {
        values.push(Box::new(id.clone()));
    }
    let params_ref: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(AsRef::as_ref).collect();

    let changed = conn
        .execute(&sql, params_from_iter(params_ref))
        .context("soft-delete folders")?;
    Ok(changed)
}

pub(crate) fn hard_delete_folders(conn: &Connection, ids: &[String]) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let changed = conn
        .execute(
            &format!("DELETE FROM folders WHERE id IN ({})", placeholders(ids.len())),
            params_from_iter(ids.iter()),
        )
        .context("hard-delete folders")?;
    Ok(changed)
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

pub(crate) fn insert_tag(conn: &Connection, tag: &Tag) -> Result<()> {
    conn.execute(
        "INSERT INTO tags (id, title, created_time, updated_time) VALUES (?1, ?2, ?3, ?4)",
        params![tag.id, tag.title, tag.created_time, tag.updated_time],
    )
    .with_context(|| format!("insert tag '{}'", tag.id))?;
    Ok(())
}

pub(crate) fn update_tag(conn: &Connection, tag: &Tag) -> Result<()> {
    conn.execute(
        "UPDATE tags SET title = ?2, created_time = ?3, updated_time = ?4 WHERE id = ?1",
        params![tag.id, tag.title, tag.created_time, tag.updated_time],
    )
    .with_context(|| format!("update tag '{}'", tag.id))?;
    Ok(())
}

pub(crate) fn delete_tag(conn: &Connection, id: &str) -> Result<usize> {
    conn.execute("DELETE FROM tags WHERE id = ?1", params![id])
        .with_context(|| format!("delete tag '{id}'"))
}

pub(crate) fn insert_note_tag(conn: &Connection, note_tag: &NoteTag) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO note_tags (tag_id, note_id, created_time) VALUES (?1, ?2, ?3)",
        params![note_tag.tag_id, note_tag.note_id, note_tag.created_time],
    )
    .context("insert note tag association")?;
    Ok(())
}

pub(crate) fn delete_note_tag(conn: &Connection, tag_id: &str, note_id: &str) -> Result<usize> {
    conn.execute(
        "DELETE FROM note_tags WHERE tag_id = ?1 AND note_id = ?2",
        params![tag_id, note_id],
    )
    .context("delete note tag association")
}

pub(crate) fn delete_note_tags_by_tag(conn: &Connection, tag_id: &str) -> Result<usize> {
    conn.execute("DELETE FROM note_tags WHERE tag_id = ?1", params![tag_id])
        .context("delete tag associations")
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

pub(crate) fn insert_resource(conn: &Connection, resource: &Resource) -> Result<()> {
    conn.execute(
        "INSERT INTO resources (id, title, mime, file_extension, size, share_id, is_shared,
         created_time, updated_time)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            resource.id,
            resource.title,
            resource.mime,
            resource.file_extension,
            resource.size,
            resource.share_id,
            resource.is_shared,
            resource.created_time,
            resource.updated_time,
        ],
    )
    .with_context(|| format!("insert resource '{}'", resource.id))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{hard_delete_notes, insert_note, soft_delete_notes};
    use crate::db::{open_in_memory, query};
    use crate::model::Note;

    fn make_note(id_char: char) -> Note {
        Note {
            id: id_char.to_string().repeat(32),
            title: format!("note {id_char}"),
            created_time: 1,
            updated_time: 1,
            user_created_time: 1,
            user_updated_time: 1,
            ..Default::default()
        }
    }

    #[test]
    fn soft_delete_stamps_all_three_times() {
        let conn = open_in_memory().expect("open store");
        let note = make_note('a');
        insert_note(&conn, &note).expect("insert");

        let changed =
            soft_delete_notes(&conn, std::slice::from_ref(&note.id), 777).expect("soft delete");
        assert_eq!(changed, 1);

        let stored = query::get_note(&conn, &note.id, true)
            .expect("load")
            .expect("present");
        assert_eq!(stored.deleted_time, 777);
        assert_eq!(stored.trashed_at, 777);
        assert_eq!(stored.updated_time, 777);
    }

    #[test]
    fn soft_delete_clears_conflict_flags() {
        let conn = open_in_memory().expect("open store");
        let note = Note {
            is_conflict: true,
            conflict_original_id: "b".repeat(32),
            ..make_note('a')
        };
        insert_note(&conn, &note).expect("insert");

        soft_delete_notes(&conn, std::slice::from_ref(&note.id), 777).expect("soft delete");

        let stored = query::get_note(&conn, &note.id, true)
            .expect("load")
            .expect("present");
        assert!(!stored.is_conflict);
        assert!(stored.conflict_original_id.is_empty());
    }

    #[test]
    fn hard_delete_removes_rows_and_ignores_unknown_ids() {
        let conn = open_in_memory().expect("open store");
        let note = make_note('a');
        insert_note(&conn, &note).expect("insert");

        let changed = hard_delete_notes(&conn, &[note.id.clone(), "f".repeat(32)])
            .expect("hard delete");
        assert_eq!(changed, 1);
        assert!(
            query::get_note(&conn, &note.id, true)
                .expect("load")
                .is_none()
        );
    }

    #[test]
    fn empty_id_lists_are_no_ops() {
        let conn = open_in_memory().expect("open store");
        assert_eq!(soft_delete_notes(&conn, &[], 1).expect("soft"), 0);
        assert_eq!(hard_delete_notes(&conn, &[]).expect("hard"), 0);
    }
}
