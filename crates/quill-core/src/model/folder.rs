use serde::{Deserialize, Serialize};

/// All persisted fields for a folder (notebook).
///
/// The Trash and Conflicts folders are not rows in the `folders` table;
/// their identities are computed (see [`crate::trash`]) and values of
/// this shape are synthesized for them on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Folder {
    pub id: String,
    pub parent_id: String,
    pub title: String,
    /// Empty when the folder is not part of a share.
    pub share_id: String,
    pub is_shared: bool,
    pub created_time: i64,
    pub updated_time: i64,
    pub deleted_time: i64,
}

impl Default for Folder {
    fn default() -> Self {
        Self {
            id: String::new(),
            parent_id: String::new(),
            title: String::new(),
            share_id: String::new(),
            is_shared: false,
            created_time: 0,
            updated_time: 0,
            deleted_time: 0,
        }
    }
}

impl Folder {
    /// True when the folder is in the trash.
    #[must_use]
    pub const fn is_trashed(&self) -> bool {
        self.deleted_time != 0
    }
}
