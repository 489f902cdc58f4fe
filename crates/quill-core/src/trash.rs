//! Virtual folder identities and trash inventory.
//!
//! The Trash and Conflicts folders are not ordinary rows: their ids are
//! fixed, well-known 32-hex constants, so every client derives the same
//! identity without a lookup. Values satisfying the [`Folder`] shape are
//! synthesized on demand for UI purposes.
//!
//! Display parentage inside the trash: a trashed note whose owning
//! folder was trashed with it stays nested under that folder (shown as
//! a same-named virtual subfolder of the trash root); a note trashed on
//! its own surfaces directly at the trash root.

use rusqlite::Connection;

use crate::db::query;
use crate::error::Result;
use crate::model::{Folder, Note};
use crate::notes::{self, DeleteOptions};
use crate::share::ShareContext;

/// Fixed id of the virtual trash root.
pub const TRASH_FOLDER_ID: &str = "de1e7edde1e7edde1e7edde1e7edde1e";

/// Fixed id of the virtual conflicts folder.
pub const CONFLICT_FOLDER_ID: &str = "c04f11c7c04f11c7c04f11c7c04f11c7";

#[must_use]
pub const fn trash_folder_id() -> &'static str {
    TRASH_FOLDER_ID
}

#[must_use]
pub const fn trash_folder_title() -> &'static str {
    "Trash"
}

#[must_use]
pub const fn conflict_folder_id() -> &'static str {
    CONFLICT_FOLDER_ID
}

#[must_use]
pub const fn conflict_folder_title() -> &'static str {
    "Conflicts"
}

/// True when `id` names one of the virtual folders.
#[must_use]
pub fn is_virtual_folder_id(id: &str) -> bool {
    id == TRASH_FOLDER_ID || id == CONFLICT_FOLDER_ID
}

/// A [`Folder`]-shaped value for the virtual trash root.
#[must_use]
pub fn trash_folder() -> Folder {
    Folder {
        id: TRASH_FOLDER_ID.to_string(),
        title: trash_folder_title().to_string(),
        ..Default::default()
    }
}

/// A [`Folder`]-shaped value for the virtual conflicts folder.
#[must_use]
pub fn conflict_folder() -> Folder {
    Folder {
        id: CONFLICT_FOLDER_ID.to_string(),
        title: conflict_folder_title().to_string(),
        ..Default::default()
    }
}

/// Where a trashed note is displayed: under its own folder when that
/// folder is in the trash too (hierarchy preserved), otherwise at the
/// trash root.
#[must_use]
pub fn display_parent_id(note: &Note, parent: Option<&Folder>) -> String {
    if !note.is_trashed() {
        return note.parent_id.clone();
    }
    match parent {
        Some(folder) if folder.is_trashed() => folder.id.clone(),
        _ => TRASH_FOLDER_ID.to_string(),
    }
}

/// Trashed folders presented as virtual subfolders of the trash root,
/// keyed by their original ids and titles.
pub fn trash_subfolders(conn: &Connection) -> Result<Vec<Folder>> {
    let ids = query::trashed_folder_ids(conn)?;
    let mut folders = Vec::with_capacity(ids.len());
    for id in &ids {
        if let Some(folder) = query::get_folder(conn, id, true)? {
            folders.push(folder);
        }
    }
    Ok(folders)
}

/// Everything currently in the trash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrashInventory {
    pub note_ids: Vec<String>,
    pub folder_ids: Vec<String>,
}

impl TrashInventory {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.note_ids.is_empty() && self.folder_ids.is_empty()
    }
}

/// Collect the ids of all trashed notes and folders.
pub fn items_in_trash(conn: &Connection) -> Result<TrashInventory> {
    Ok(TrashInventory {
        note_ids: query::trashed_note_ids(conn)?,
        folder_ids: query::trashed_folder_ids(conn)?,
    })
}

/// Purge everything in the trash. Returns false when the trash was
/// already empty. Notes go through the batch purge path; folder rows
/// are removed one by one without touching their (already purged)
/// children.
pub fn empty_trash(conn: &Connection, ctx: &ShareContext) -> Result<bool> {
    let inventory = items_in_trash(conn)?;
    if inventory.is_empty() {
        return Ok(false);
    }

    notes::batch_delete(
        conn,
        ctx,
        &inventory.note_ids,
        &DeleteOptions {
            source_description: Some("empty_trash/notes".into()),
            ..Default::default()
        },
    )?;

    for folder_id in &inventory.folder_ids {
        crate::folders::delete(
            conn,
            ctx,
            folder_id,
            &crate::folders::FolderDeleteOptions {
                source_description: Some("empty_trash/folders".into()),
                ..Default::default()
            },
        )?;
    }

    tracing::debug!(
        notes = inventory.note_ids.len(),
        folders = inventory.folder_ids.len(),
        "emptied trash"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::{
        CONFLICT_FOLDER_ID, TRASH_FOLDER_ID, conflict_folder, display_parent_id,
        is_virtual_folder_id, trash_folder,
    };
    use crate::model::{Folder, Note};

    #[test]
    fn virtual_ids_are_well_formed_and_distinct() {
        assert_eq!(TRASH_FOLDER_ID.len(), 32);
        assert_eq!(CONFLICT_FOLDER_ID.len(), 32);
        assert!(TRASH_FOLDER_ID.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(CONFLICT_FOLDER_ID.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(TRASH_FOLDER_ID, CONFLICT_FOLDER_ID);
        assert!(is_virtual_folder_id(TRASH_FOLDER_ID));
        assert!(is_virtual_folder_id(CONFLICT_FOLDER_ID));
        assert!(!is_virtual_folder_id(&"0".repeat(32)));
    }

    #[test]
    fn virtual_folder_values_carry_titles() {
        assert_eq!(trash_folder().title, "Trash");
        assert_eq!(conflict_folder().title, "Conflicts");
    }

    #[test]
    fn trashed_note_in_live_folder_displays_at_root() {
        let note = Note {
            parent_id: "f".repeat(32),
            deleted_time: 5,
            ..Default::default()
        };
        let live_folder = Folder {
            id: "f".repeat(32),
            ..Default::default()
        };

        assert_eq!(
            display_parent_id(&note, Some(&live_folder)),
            TRASH_FOLDER_ID
        );
        assert_eq!(display_parent_id(&note, None), TRASH_FOLDER_ID);
    }

    #[test]
    fn trashed_note_in_trashed_folder_keeps_hierarchy() {
        let note = Note {
            parent_id: "f".repeat(32),
            deleted_time: 5,
            ..Default::default()
        };
        let trashed_folder = Folder {
            id: "f".repeat(32),
            deleted_time: 5,
            ..Default::default()
        };

        assert_eq!(
            display_parent_id(&note, Some(&trashed_folder)),
            "f".repeat(32)
        );
    }

    #[test]
    fn active_note_keeps_its_parent() {
        let note = Note {
            parent_id: "f".repeat(32),
            ..Default::default()
        };
        assert_eq!(display_parent_id(&note, None), "f".repeat(32));
    }
}
