//! FTS5 full-text search over note titles and bodies.
//!
//! The `notes_fts` virtual table is kept in sync with `notes` by
//! INSERT/UPDATE/DELETE triggers (see [`super::schema`]), so a trashed
//! or purged note can never linger in the index. Queries additionally
//! join against `notes` to exclude trashed and conflict rows, which
//! keeps results correct even across an index rebuild.
//!
//! Tokenizer: porter stemmer + `unicode61` with prefix indexes on 2 and
//! 3 characters, so `note*` matches "notes", "notebook", etc.

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

/// An FTS5 search hit with BM25 relevance score (lower = better).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub rank: f64,
}

/// Search active notes with BM25 ranking (title weighted 3×, body 1×).
///
/// Trashed notes and conflict notes are never returned.
///
/// # Errors
///
/// Returns an error if the FTS5 query is malformed or the database is
/// not properly initialized.
pub fn search_notes(conn: &Connection, query: &str, limit: u32) -> Result<Vec<SearchHit>> {
    let sql = "SELECT f.id, n.title, bm25(notes_fts, 3.0, 1.0) AS rank \
               FROM notes_fts f \
               INNER JOIN notes n ON n.id = f.id \
               WHERE notes_fts MATCH ?1 AND n.deleted_time = 0 AND n.is_conflict = 0 \
               ORDER BY rank \
               LIMIT ?2";

    let mut stmt = conn.prepare(sql).context("prepare FTS5 search query")?;

    let rows = stmt
        .query_map(params![query, limit], |row| {
            Ok(SearchHit {
                id: row.get(0)?,
                title: row.get(1)?,
                rank: row.get(2)?,
            })
        })
        .with_context(|| format!("execute FTS5 search for '{query}'"))?;

    let mut hits = Vec::new();
    for row in rows {
        hits.push(row.context("read FTS5 search hit")?);
    }
    Ok(hits)
}

/// Rebuild the FTS5 index from the current `notes` table.
///
/// Drops and recreates all index content. Useful when the index is
/// suspected to be out of sync (e.g. after a bulk import done with
/// triggers disabled).
///
/// # Errors
///
/// Returns an error if the rebuild SQL fails.
pub fn rebuild_index(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DELETE FROM notes_fts;
         INSERT INTO notes_fts(rowid, title, body, id)
         SELECT rowid, title, body, id FROM notes;",
    )
    .context("rebuild FTS5 index from notes table")?;
    Ok(())
}

/// Number of rows in the FTS5 index. Diagnostics only.
///
/// # Errors
///
/// Returns an error if the count query fails.
pub fn index_row_count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM notes_fts", [], |row| row.get(0))
        .context("count notes_fts rows")
}

#[cfg(test)]
mod tests {
    use super::{index_row_count, rebuild_index, search_notes};
    use crate::db::open_in_memory;
    use rusqlite::{Connection, params};

    fn insert_note(conn: &Connection, id: &str, title: &str, body: &str) {
        conn.execute(
            "INSERT INTO notes (id, title, body, created_time, updated_time,
             user_created_time, user_updated_time)
             VALUES (?1, ?2, ?3, 1, 1, 1, 1)",
            params![id.repeat(32), title, body],
        )
        .expect("insert note");
    }

    #[test]
    fn search_matches_title_and_body() {
        let conn = open_in_memory().expect("open store");
        insert_note(&conn, "a", "meeting notes", "agenda for tomorrow");
        insert_note(&conn, "b", "groceries", "milk and eggs");

        let hits = search_notes(&conn, "meeting", 10).expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "meeting notes");

        let hits = search_notes(&conn, "eggs", 10).expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b".repeat(32));
    }

    #[test]
    fn trashed_notes_are_excluded() {
        let conn = open_in_memory().expect("open store");
        insert_note(&conn, "a", "first note", "");
        insert_note(&conn, "b", "second note", "");

        conn.execute(
            "UPDATE notes SET deleted_time = 99 WHERE id = ?1",
            params!["a".repeat(32)],
        )
        .expect("trash note");

        let hits = search_notes(&conn, "note*", 10).expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b".repeat(32));
    }

    #[test]
    fn rebuild_restores_a_cleared_index() {
        let conn = open_in_memory().expect("open store");
        insert_note(&conn, "a", "hello", "world");

        conn.execute("DELETE FROM notes_fts", [])
            .expect("clear index");
        assert_eq!(index_row_count(&conn).expect("count"), 0);

        rebuild_index(&conn).expect("rebuild");
        assert_eq!(index_row_count(&conn).expect("count"), 1);
    }
}
