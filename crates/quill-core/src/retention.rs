//! Retention sweeping: permanent removal of old trash.
//!
//! Notes sit in the trash for a grace period (7 days by default) and
//! are then purged for good. The sweep is meant to run on a recurring
//! external schedule (e.g. daily) but is safe to call at any time:
//! running it twice in a row with nothing newly eligible is a no-op,
//! and notes that disappear between selection and purge are skipped by
//! the batch delete.
//!
//! Conflict notes live in the Conflicts view, not the trash; the sweep
//! never touches them unless they have been trashed too.

use rusqlite::Connection;

use crate::config::RetentionConfig;
use crate::db::query;
use crate::error::Result;
use crate::notes::{self, DeleteOptions};
use crate::share::ShareContext;
use crate::time;

/// Purge every note whose trash timestamp is older than the retention
/// window. Returns the ids that were purged.
pub fn delete_old_trashed_notes(
    conn: &Connection,
    ctx: &ShareContext,
    retention: &RetentionConfig,
) -> Result<Vec<String>> {
    let cutoff = time::now_ms() - i64::from(retention.days) * time::DAY_MS;
    let expired = query::trashed_note_ids_older_than(conn, cutoff)?;

    if expired.is_empty() {
        return Ok(expired);
    }

    let outcome = notes::batch_delete(
        conn,
        ctx,
        &expired,
        &DeleteOptions {
            source_description: Some("retention sweep".into()),
            ..Default::default()
        },
    )?;

    tracing::info!(
        purged = outcome.purged.len(),
        retention_days = retention.days,
        "purged expired trash"
    );
    Ok(outcome.purged)
}

#[cfg(test)]
mod tests {
    use super::delete_old_trashed_notes;
    use crate::config::RetentionConfig;
    use crate::db::open_in_memory;
    use crate::model::Note;
    use crate::notes::{self, DeleteOptions, SaveOptions};
    use crate::share::ShareContext;
    use crate::time;
    use rusqlite::{Connection, params};

    fn trashed_note(conn: &Connection, ctx: &ShareContext, title: &str) -> String {
        let note = notes::save(
            conn,
            ctx,
            Note {
                title: title.into(),
                ..Default::default()
            },
            &SaveOptions::default(),
        )
        .expect("save note");
        notes::delete(
            conn,
            ctx,
            &note.id,
            &DeleteOptions {
                to_trash: true,
                ..Default::default()
            },
        )
        .expect("trash note");
        note.id
    }

    fn backdate_trash(conn: &Connection, note_id: &str, days: i64) {
        let then = time::now_ms() - days * time::DAY_MS;
        conn.execute(
            "UPDATE notes SET trashed_at = ?1 WHERE id = ?2",
            params![then, note_id],
        )
        .expect("backdate");
    }

    #[test]
    fn purges_old_trash_and_keeps_recent_trash() {
        let conn = open_in_memory().expect("open store");
        let ctx = ShareContext::new();

        let old = trashed_note(&conn, &ctx, "old note");
        let young = trashed_note(&conn, &ctx, "young note");
        backdate_trash(&conn, &old, 8);

        let purged = delete_old_trashed_notes(&conn, &ctx, &RetentionConfig::default())
            .expect("sweep");

        assert_eq!(purged, vec![old.clone()]);
        assert!(notes::load(&conn, &old).expect("load").is_none());
        assert!(notes::load(&conn, &young).expect("load").is_some());
    }

    #[test]
    fn never_touches_untrashed_notes() {
        let conn = open_in_memory().expect("open store");
        let ctx = ShareContext::new();

        let active = notes::save(
            &conn,
            &ctx,
            Note {
                title: "normal note".into(),
                ..Default::default()
            },
            &SaveOptions::default(),
        )
        .expect("save note");

        // Even a stale updated_time must not make an active note eligible.
        conn.execute(
            "UPDATE notes SET updated_time = 1 WHERE id = ?1",
            params![active.id],
        )
        .expect("backdate updated_time");

        let purged = delete_old_trashed_notes(&conn, &ctx, &RetentionConfig::default())
            .expect("sweep");
        assert!(purged.is_empty());
        assert!(notes::load(&conn, &active.id).expect("load").is_some());
    }

    #[test]
    fn sweep_is_idempotent() {
        let conn = open_in_memory().expect("open store");
        let ctx = ShareContext::new();

        let old = trashed_note(&conn, &ctx, "old note");
        backdate_trash(&conn, &old, 30);

        let retention = RetentionConfig::default();
        let first = delete_old_trashed_notes(&conn, &ctx, &retention).expect("first sweep");
        let second = delete_old_trashed_notes(&conn, &ctx, &retention).expect("second sweep");

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn untrashed_conflicts_are_not_swept() {
        let conn = open_in_memory().expect("open store");
        let ctx = ShareContext::new();

        let original = notes::save(
            &conn,
            &ctx,
            Note {
                title: "note".into(),
                ..Default::default()
            },
            &SaveOptions::default(),
        )
        .expect("save note");
        let conflict =
            notes::create_conflict_note(&conn, &original, crate::share::ChangeSource::Sync)
                .expect("create conflict");

        let purged = delete_old_trashed_notes(&conn, &ctx, &RetentionConfig::default())
            .expect("sweep");
        assert!(purged.is_empty());
        assert!(notes::load(&conn, &conflict.id).expect("load").is_some());
    }
}
