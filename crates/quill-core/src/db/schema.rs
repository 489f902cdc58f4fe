//! Canonical SQLite schema for the quill store.
//!
//! The schema is normalized for queryability:
//! - `notes`, `folders`, `tags`, `resources` keep the latest fields for
//!   each item
//! - `note_tags` models the tag↔note many-to-many relationship
//! - `notes_fts` is an FTS5 index over note titles and bodies, kept in
//!   sync with `notes` by triggers so deletions can never leak into
//!   search results

/// Migration v1: core tables.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY CHECK (length(id) = 32),
    parent_id TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    body TEXT NOT NULL DEFAULT '',
    is_todo INTEGER NOT NULL DEFAULT 0 CHECK (is_todo IN (0, 1)),
    todo_due INTEGER NOT NULL DEFAULT 0,
    todo_completed INTEGER NOT NULL DEFAULT 0,
    is_conflict INTEGER NOT NULL DEFAULT 0 CHECK (is_conflict IN (0, 1)),
    conflict_original_id TEXT NOT NULL DEFAULT '',
    share_id TEXT NOT NULL DEFAULT '',
    is_shared INTEGER NOT NULL DEFAULT 0 CHECK (is_shared IN (0, 1)),
    created_time INTEGER NOT NULL,
    updated_time INTEGER NOT NULL,
    user_created_time INTEGER NOT NULL,
    user_updated_time INTEGER NOT NULL,
    deleted_time INTEGER NOT NULL DEFAULT 0,
    trashed_at INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS folders (
    id TEXT PRIMARY KEY CHECK (length(id) = 32),
    parent_id TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    share_id TEXT NOT NULL DEFAULT '',
    is_shared INTEGER NOT NULL DEFAULT 0 CHECK (is_shared IN (0, 1)),
    created_time INTEGER NOT NULL,
    updated_time INTEGER NOT NULL,
    deleted_time INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS tags (
    id TEXT PRIMARY KEY CHECK (length(id) = 32),
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    created_time INTEGER NOT NULL,
    updated_time INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS note_tags (
    tag_id TEXT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    note_id TEXT NOT NULL,
    created_time INTEGER NOT NULL,
    PRIMARY KEY (tag_id, note_id)
);

CREATE TABLE IF NOT EXISTS resources (
    id TEXT PRIMARY KEY CHECK (length(id) = 32),
    title TEXT NOT NULL DEFAULT '',
    mime TEXT NOT NULL DEFAULT '',
    file_extension TEXT NOT NULL DEFAULT '',
    size INTEGER NOT NULL DEFAULT 0,
    share_id TEXT NOT NULL DEFAULT '',
    is_shared INTEGER NOT NULL DEFAULT 0 CHECK (is_shared IN (0, 1)),
    created_time INTEGER NOT NULL,
    updated_time INTEGER NOT NULL
);
";

/// Migration v2: read-path indexes and the FTS5 table/triggers.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_notes_parent_deleted
    ON notes(parent_id, deleted_time);

CREATE INDEX IF NOT EXISTS idx_notes_deleted_trashed
    ON notes(deleted_time, trashed_at);

CREATE INDEX IF NOT EXISTS idx_notes_conflict
    ON notes(is_conflict, deleted_time);

CREATE INDEX IF NOT EXISTS idx_folders_parent
    ON folders(parent_id);

CREATE INDEX IF NOT EXISTS idx_tags_title_nocase
    ON tags(title COLLATE NOCASE);

CREATE INDEX IF NOT EXISTS idx_note_tags_note
    ON note_tags(note_id, tag_id);

CREATE VIRTUAL TABLE IF NOT EXISTS notes_fts USING fts5(
    title,
    body,
    id UNINDEXED,
    tokenize='porter unicode61',
    prefix='2 3'
);

CREATE TRIGGER IF NOT EXISTS notes_ai
AFTER INSERT ON notes
BEGIN
    INSERT INTO notes_fts(rowid, title, body, id)
    VALUES (new.rowid, new.title, new.body, new.id);
END;

CREATE TRIGGER IF NOT EXISTS notes_au
AFTER UPDATE ON notes
BEGIN
    DELETE FROM notes_fts WHERE rowid = old.rowid;
    INSERT INTO notes_fts(rowid, title, body, id)
    VALUES (new.rowid, new.title, new.body, new.id);
END;

CREATE TRIGGER IF NOT EXISTS notes_ad
AFTER DELETE ON notes
BEGIN
    DELETE FROM notes_fts WHERE rowid = old.rowid;
END;
";

/// Indexes the schema is expected to carry after migration, used by
/// tests and diagnostics.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_notes_parent_deleted",
    "idx_notes_deleted_trashed",
    "idx_notes_conflict",
    "idx_folders_parent",
    "idx_tags_title_nocase",
    "idx_note_tags_note",
];
