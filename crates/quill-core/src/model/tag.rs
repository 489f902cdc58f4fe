use serde::{Deserialize, Serialize};

/// A tag. Titles are unique case-insensitively; user-side saves
/// normalize them to trimmed lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: String,
    pub title: String,
    pub created_time: i64,
    pub updated_time: i64,
}

impl Default for Tag {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            created_time: 0,
            updated_time: 0,
        }
    }
}

/// A tag↔note association row. Deleting a tag removes all of its
/// association rows first, so no orphans survive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteTag {
    pub tag_id: String,
    pub note_id: String,
    pub created_time: i64,
}
