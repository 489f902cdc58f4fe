//! Tag operations.
//!
//! Tags relate to notes through `note_tags` join rows. Association
//! loops here are sequential best-effort: each add/remove is its own
//! statement, and a failure mid-loop leaves the earlier associations in
//! place. Callers that need all-or-nothing must wrap a transaction
//! around the whole call.

use rusqlite::Connection;

use crate::db::query;
use crate::error::{Error, Result};
use crate::model::{NoteTag, Tag};
use crate::{id, store, time};

/// Options for [`save`].
#[derive(Debug, Clone, Default)]
pub struct TagSaveOptions {
    /// Normalize the title and reject case-insensitive duplicates.
    pub user_side_validation: bool,
}

/// Save a tag: insert when the id is empty or unknown, update
/// otherwise.
///
/// With `user_side_validation`, the title is trimmed and lowercased and
/// a title already used by a different tag (case-insensitively) is
/// refused — tag titles are unique.
pub fn save(conn: &Connection, mut tag: Tag, options: &TagSaveOptions) -> Result<Tag> {
    if options.user_side_validation {
        tag.title = tag.title.trim().to_lowercase();

        if let Some(existing) = query::tag_by_title(conn, &tag.title)? {
            if existing.id != tag.id {
                return Err(Error::Validation(format!(
                    "the tag \"{}\" already exists",
                    tag.title
                )));
            }
        }
    }

    let now = time::now_ms();
    let existing = if tag.id.is_empty() {
        None
    } else {
        query::get_tag(conn, &tag.id)?
    };

    match existing {
        None => {
            if tag.id.is_empty() {
                tag.id = id::generate();
            }
            if tag.created_time == 0 {
                tag.created_time = now;
            }
            tag.updated_time = now;
            store::insert_tag(conn, &tag)?;
        }
        Some(stored) => {
            if tag.created_time == 0 {
                tag.created_time = stored.created_time;
            }
            tag.updated_time = now;
            store::update_tag(conn, &tag)?;
        }
    }

    Ok(tag)
}

/// Load a tag by id.
pub fn load(conn: &Connection, tag_id: &str) -> Result<Option<Tag>> {
    Ok(query::get_tag(conn, tag_id)?)
}

/// Load a tag by title, case-insensitively.
pub fn load_by_title(conn: &Connection, title: &str) -> Result<Option<Tag>> {
    Ok(query::tag_by_title(conn, title)?)
}

/// Attach a tag to a note. Attaching an already-attached tag is a
/// no-op.
pub fn add_note(conn: &Connection, tag_id: &str, note_id: &str) -> Result<()> {
    if query::has_note_tag(conn, tag_id, note_id)? {
        return Ok(());
    }

    store::insert_note_tag(
        conn,
        &NoteTag {
            tag_id: tag_id.to_string(),
            note_id: note_id.to_string(),
            created_time: time::now_ms(),
        },
    )?;
    Ok(())
}

/// Detach a tag from a note.
pub fn remove_note(conn: &Connection, tag_id: &str, note_id: &str) -> Result<()> {
    store::delete_note_tag(conn, tag_id, note_id)?;
    Ok(())
}

/// Ids of active notes carrying the tag.
pub fn note_ids(conn: &Connection, tag_id: &str) -> Result<Vec<String>> {
    Ok(query::note_ids_by_tag_id(conn, tag_id)?)
}

/// True when the tag is attached to the active note.
pub fn has_note(conn: &Connection, tag_id: &str, note_id: &str) -> Result<bool> {
    Ok(query::has_note_tag(conn, tag_id, note_id)?)
}

/// Tags attached to a note, ordered by title.
pub fn tags_by_note_id(conn: &Connection, note_id: &str) -> Result<Vec<Tag>> {
    let tag_ids = query::tag_ids_by_note_id(conn, note_id)?;
    Ok(query::tags_by_ids(conn, &tag_ids)?)
}

/// Tags attached to every one of `note_ids`. Empty input yields an
/// empty result.
pub fn common_tags_by_note_ids(conn: &Connection, note_ids: &[String]) -> Result<Vec<Tag>> {
    let Some(first) = note_ids.first() else {
        return Ok(Vec::new());
    };

    let mut common: Vec<String> = query::tag_ids_by_note_id(conn, first)?;
    for note_id in &note_ids[1..] {
        if common.is_empty() {
            break;
        }
        let tag_ids = query::tag_ids_by_note_id(conn, note_id)?;
        common.retain(|tag_id| tag_ids.contains(tag_id));
    }

    Ok(query::tags_by_ids(conn, &common)?)
}

/// Set the tags of a note from titles: missing tags are created
/// (user-side validated), titles are matched case-insensitively, and
/// previously attached tags absent from `titles` are removed.
pub fn set_note_tags_by_titles(conn: &Connection, note_id: &str, titles: &[String]) -> Result<()> {
    let previous = tags_by_note_id(conn, note_id)?;
    let mut added_titles: Vec<String> = Vec::new();

    for raw in titles {
        let title = raw.trim().to_lowercase();
        if title.is_empty() {
            continue;
        }
        let tag = match load_by_title(conn, &title)? {
            Some(tag) => tag,
            None => save(
                conn,
                Tag {
                    title: title.clone(),
                    ..Default::default()
                },
                &TagSaveOptions {
                    user_side_validation: true,
                },
            )?,
        };
        add_note(conn, &tag.id, note_id)?;
        added_titles.push(title);
    }

    for tag in previous {
        if !added_titles.contains(&tag.title.to_lowercase()) {
            remove_note(conn, &tag.id, note_id)?;
        }
    }

    Ok(())
}

/// Set the tags of a note from tag ids, removing previously attached
/// tags absent from `tag_ids`.
pub fn set_note_tags_by_ids(conn: &Connection, note_id: &str, tag_ids: &[String]) -> Result<()> {
    let previous = tags_by_note_id(conn, note_id)?;

    for tag_id in tag_ids {
        add_note(conn, tag_id, note_id)?;
    }

    for tag in previous {
        if !tag_ids.contains(&tag.id) {
            remove_note(conn, &tag.id, note_id)?;
        }
    }

    Ok(())
}

/// Delete a tag: all of its note associations are removed first, so no
/// orphaned join rows survive, then the tag row itself goes.
pub fn untag_all(conn: &Connection, tag_id: &str) -> Result<()> {
    let removed = store::delete_note_tags_by_tag(conn, tag_id)?;
    store::delete_tag(conn, tag_id)?;
    tracing::debug!(tag_id, associations = removed, "deleted tag");
    Ok(())
}
