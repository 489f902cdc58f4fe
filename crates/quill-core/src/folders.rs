//! Folder lifecycle operations.
//!
//! Folders mirror the note rules: read-only shares are enforced at the
//! model layer, and deleting a folder can either leave its contents in
//! place or take the whole subtree to the trash (which is what keeps
//! the folder hierarchy visible inside the trash view).
//!
//! The Conflicts virtual folder id may be saved as a row exactly once —
//! some UI layers bootstrap it so the conflict view has a backing
//! entity. The Trash id is never a row.

use rusqlite::Connection;

use crate::db::query;
use crate::error::{Error, Result};
use crate::model::Folder;
use crate::notes::{self, DeleteOptions, SaveOptions};
use crate::share::ShareContext;
use crate::{id, store, time, trash};

/// Options for [`delete`].
#[derive(Debug, Clone, Default)]
pub struct FolderDeleteOptions {
    /// Soft-delete into the trash instead of purging the row.
    pub to_trash: bool,
    /// Also delete every descendant note and subfolder.
    pub delete_children: bool,
    pub change_source: crate::share::ChangeSource,
    /// Free-text provenance, for audit logging only.
    pub source_description: Option<String>,
}

/// Save a folder: insert when the id is empty or unknown, update
/// otherwise.
///
/// Saving a row under the Conflicts id is permitted exactly once (the
/// bootstrap); any further save with that id, and any save with the
/// Trash id, is refused.
pub fn save(
    conn: &Connection,
    ctx: &ShareContext,
    mut folder: Folder,
    options: &SaveOptions,
) -> Result<Folder> {
    if folder.id == trash::trash_folder_id() {
        return Err(Error::ReservedFolderId(folder.id));
    }

    let existing = if folder.id.is_empty() {
        None
    } else {
        query::get_folder(conn, &folder.id, true)?
    };

    if folder.id == trash::conflict_folder_id() && existing.is_some() {
        return Err(Error::ReservedFolderId(folder.id));
    }

    let now = time::now_ms();
    match existing {
        None => {
            ensure_parent_writable(conn, ctx, &folder.parent_id)?;

            if folder.id.is_empty() {
                folder.id = id::generate();
            } else if !id::is_valid(&folder.id) {
                return Err(Error::Validation(format!(
                    "invalid folder id '{}'",
                    folder.id
                )));
            }

            if options.auto_timestamp {
                if folder.created_time == 0 {
                    folder.created_time = now;
                }
                folder.updated_time = now;
            }

            store::insert_folder(conn, &folder)?;
            tracing::debug!(folder_id = %folder.id, "created folder");
        }
        Some(stored) => {
            if !options.change_source.is_sync() && ctx.is_read_only(&stored.share_id) {
                return Err(Error::IsReadOnly {
                    share_id: stored.share_id,
                });
            }

            if folder.created_time == 0 {
                folder.created_time = stored.created_time;
            }
            if options.auto_timestamp {
                folder.updated_time = now;
            }

            store::update_folder(conn, &folder)?;
            tracing::debug!(folder_id = %folder.id, "updated folder");
        }
    }

    Ok(folder)
}

fn ensure_parent_writable(conn: &Connection, ctx: &ShareContext, folder_id: &str) -> Result<()> {
    if folder_id.is_empty() {
        return Ok(());
    }
    if let Some(parent) = query::get_folder(conn, folder_id, true)? {
        if ctx.is_read_only(&parent.share_id) {
            return Err(Error::IsReadOnly {
                share_id: parent.share_id,
            });
        }
    }
    Ok(())
}

/// Folder ids of the whole subtree rooted at `folder_id`, the root
/// first.
fn subtree_folder_ids(conn: &Connection, folder_id: &str) -> Result<Vec<String>> {
    let mut all = vec![folder_id.to_string()];
    let mut frontier = vec![folder_id.to_string()];

    while let Some(current) = frontier.pop() {
        for child in query::child_folders(conn, &current, true)? {
            frontier.push(child.id.clone());
            all.push(child.id);
        }
    }
    Ok(all)
}

/// Delete a folder, optionally with its whole subtree.
///
/// With `to_trash`, the folder rows get `deleted_time` stamped and the
/// contained notes go through the note trash path, so they keep their
/// `parent_id` and surface as a subfolder of the trash view. Without
/// `delete_children`, only the folder row itself is affected (the form
/// used when purging an already-emptied trash folder).
pub fn delete(
    conn: &Connection,
    ctx: &ShareContext,
    folder_id: &str,
    options: &FolderDeleteOptions,
) -> Result<()> {
    if trash::is_virtual_folder_id(folder_id) {
        return Err(Error::ReservedFolderId(folder_id.to_string()));
    }

    let Some(folder) = query::get_folder(conn, folder_id, true)? else {
        return Ok(());
    };

    if !options.change_source.is_sync() && ctx.is_read_only(&folder.share_id) {
        return Err(Error::IsReadOnly {
            share_id: folder.share_id,
        });
    }

    let folder_ids = if options.delete_children {
        subtree_folder_ids(conn, folder_id)?
    } else {
        vec![folder_id.to_string()]
    };

    if options.delete_children {
        let mut note_ids = Vec::new();
        for fid in &folder_ids {
            note_ids.extend(query::note_ids_in_folder(conn, fid, true)?);
        }
        notes::batch_delete(
            conn,
            ctx,
            &note_ids,
            &DeleteOptions {
                to_trash: options.to_trash,
                change_source: options.change_source,
                source_description: options.source_description.clone(),
            },
        )?;
    }

    let now = time::now_ms();
    if options.to_trash {
        store::soft_delete_folders(conn, &folder_ids, now)?;
    } else {
        store::hard_delete_folders(conn, &folder_ids)?;
    }

    tracing::debug!(
        folder_id,
        to_trash = options.to_trash,
        with_children = options.delete_children,
        source = options.source_description.as_deref().unwrap_or("unspecified"),
        "deleted folder"
    );
    Ok(())
}

/// Ids of the notes directly inside a folder.
pub fn note_ids(conn: &Connection, folder_id: &str, include_deleted: bool) -> Result<Vec<String>> {
    Ok(query::note_ids_in_folder(conn, folder_id, include_deleted)?)
}

/// Load a folder by id, including trashed ones.
pub fn load(conn: &Connection, folder_id: &str) -> Result<Option<Folder>> {
    Ok(query::get_folder(conn, folder_id, true)?)
}
