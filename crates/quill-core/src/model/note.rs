use serde::{Deserialize, Serialize};

/// The two representations a note can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Note,
    Todo,
}

/// All persisted fields for a note.
///
/// Timestamps are unix milliseconds. `created_time`/`updated_time` are
/// system bookkeeping; `user_created_time`/`user_updated_time` track
/// what the user sees and can be backdated by imports. `deleted_time`
/// is 0 for active notes; non-zero means the note is in the trash and
/// excluded from normal previews and search. `trashed_at` mirrors
/// `deleted_time` when the note went through the trash path, and drives
/// retention sweeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    pub id: String,
    pub parent_id: String,
    pub title: String,
    pub body: String,
    pub is_todo: bool,
    pub todo_due: i64,
    pub todo_completed: i64,
    pub is_conflict: bool,
    /// Back-reference to the note this one conflicts with. Never an
    /// ownership edge: deleting the original does not cascade here.
    pub conflict_original_id: String,
    /// Empty when the note is not part of a share.
    pub share_id: String,
    pub is_shared: bool,
    pub created_time: i64,
    pub updated_time: i64,
    pub user_created_time: i64,
    pub user_updated_time: i64,
    pub deleted_time: i64,
    pub trashed_at: i64,
}

impl Default for Note {
    fn default() -> Self {
        Self {
            id: String::new(),
            parent_id: String::new(),
            title: String::new(),
            body: String::new(),
            is_todo: false,
            todo_due: 0,
            todo_completed: 0,
            is_conflict: false,
            conflict_original_id: String::new(),
            share_id: String::new(),
            is_shared: false,
            created_time: 0,
            updated_time: 0,
            user_created_time: 0,
            user_updated_time: 0,
            deleted_time: 0,
            trashed_at: 0,
        }
    }
}

impl Note {
    #[must_use]
    pub const fn note_type(&self) -> NoteType {
        if self.is_todo { NoteType::Todo } else { NoteType::Note }
    }

    /// True when the note is in the trash.
    #[must_use]
    pub const fn is_trashed(&self) -> bool {
        self.deleted_time != 0
    }

    /// True for an uncompleted todo (the kind listed on top when
    /// `uncompleted_todos_on_top` is requested).
    #[must_use]
    pub const fn is_uncompleted_todo(&self) -> bool {
        self.is_todo && self.todo_completed == 0
    }
}

/// Result of a note↔todo conversion.
///
/// `changed` is false when the note already had the target type; the
/// note is then returned untouched, so callers can skip a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTypeChange {
    pub changed: bool,
    pub note: Note,
}

/// Convert a note between the "note" and "todo" representations.
///
/// A no-op conversion reports `changed: false`. A real conversion
/// resets the todo-specific fields so a former todo does not keep a
/// stale due date or completion timestamp.
#[must_use]
pub fn change_note_type(note: &Note, target: NoteType) -> NoteTypeChange {
    if note.note_type() == target {
        return NoteTypeChange {
            changed: false,
            note: note.clone(),
        };
    }

    let mut converted = note.clone();
    converted.is_todo = matches!(target, NoteType::Todo);
    converted.todo_due = 0;
    converted.todo_completed = 0;
    NoteTypeChange {
        changed: true,
        note: converted,
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteType, change_note_type};

    #[test]
    fn converts_note_to_todo_and_back() {
        let note = Note {
            title: "ma note".into(),
            ..Default::default()
        };

        let to_todo = change_note_type(&note, NoteType::Todo);
        assert!(to_todo.changed);
        assert!(to_todo.note.is_todo);

        let again = change_note_type(&to_todo.note, NoteType::Todo);
        assert!(!again.changed);
        assert!(again.note.is_todo);

        let back = change_note_type(&again.note, NoteType::Note);
        assert!(back.changed);
        assert!(!back.note.is_todo);
    }

    #[test]
    fn conversion_resets_todo_fields() {
        let todo = Note {
            is_todo: true,
            todo_due: 123,
            todo_completed: 456,
            ..Default::default()
        };

        let converted = change_note_type(&todo, NoteType::Note);
        assert_eq!(converted.note.todo_due, 0);
        assert_eq!(converted.note.todo_completed, 0);
    }

    #[test]
    fn serde_round_trips_with_stable_field_names() {
        let note = Note {
            id: "06894e83b8f84d3d8cbe0f1587f9e226".into(),
            title: "ma note".into(),
            is_todo: true,
            ..Default::default()
        };

        let value = serde_json::to_value(&note).expect("serialize note");
        assert_eq!(value["deleted_time"], 0);
        assert_eq!(value["trashed_at"], 0);
        assert_eq!(value["is_todo"], true);

        let back: Note = serde_json::from_value(value).expect("deserialize note");
        assert_eq!(back, note);
    }

    #[test]
    fn uncompleted_todo_detection() {
        let mut note = Note::default();
        assert!(!note.is_uncompleted_todo());
        note.is_todo = true;
        assert!(note.is_uncompleted_todo());
        note.todo_completed = 1000;
        assert!(!note.is_uncompleted_todo());
    }
}
