//! Resource store operations.
//!
//! Resources are attachments referenced from note bodies via `:/<id>`
//! links. Metadata lives in the `resources` table; the bytes live under
//! the resource directory as `<id>.<ext>`.

use std::path::Path;

use anyhow::Context;
use rusqlite::Connection;

use crate::db::query;
use crate::error::{Error, Result};
use crate::model::Resource;
use crate::{id, store, time};

/// Register a new resource. An empty id is filled in; timestamps are
/// stamped when unset.
pub fn create(conn: &Connection, mut resource: Resource) -> Result<Resource> {
    if resource.id.is_empty() {
        resource.id = id::generate();
    }
    let now = time::now_ms();
    if resource.created_time == 0 {
        resource.created_time = now;
    }
    if resource.updated_time == 0 {
        resource.updated_time = now;
    }

    store::insert_resource(conn, &resource)?;
    Ok(resource)
}

/// Load a resource by id.
pub fn load(conn: &Connection, resource_id: &str) -> Result<Option<Resource>> {
    Ok(query::get_resource(conn, resource_id)?)
}

/// Deep-copy a resource: fresh id, cleared `share_id`, reset
/// `is_shared`, fresh timestamps, and — when the resource directory is
/// given and the backing file exists — a byte-identical copy of the
/// file under the new name.
pub fn deep_copy(
    conn: &Connection,
    resource_dir: Option<&Path>,
    resource_id: &str,
) -> Result<Resource> {
    let src = load(conn, resource_id)?
        .ok_or_else(|| Error::Validation(format!("no such resource: '{resource_id}'")))?;

    let now = time::now_ms();
    let mut copy = src.clone();
    copy.id = id::generate();
    copy.share_id.clear();
    copy.is_shared = false;
    copy.created_time = now;
    copy.updated_time = time::bump_past(now, src.updated_time);

    store::insert_resource(conn, &copy)?;

    if let Some(dir) = resource_dir {
        let from = dir.join(src.filename());
        if from.exists() {
            let to = dir.join(copy.filename());
            std::fs::copy(&from, &to)
                .with_context(|| format!("copy resource file {}", from.display()))?;
        } else {
            tracing::debug!(resource_id, "resource file missing, copied metadata only");
        }
    }

    tracing::debug!(src = %src.id, copy = %copy.id, "deep-copied resource");
    Ok(copy)
}

#[cfg(test)]
mod tests {
    use super::{create, deep_copy, load};
    use crate::db::{open_in_memory, query};
    use crate::model::Resource;

    #[test]
    fn deep_copy_resets_identity_and_share_fields() {
        let conn = open_in_memory().expect("open store");
        let original = create(
            &conn,
            Resource {
                file_extension: "jpg".into(),
                mime: "image/jpeg".into(),
                share_id: "SHARE".into(),
                is_shared: true,
                ..Default::default()
            },
        )
        .expect("create resource");

        let copy = deep_copy(&conn, None, &original.id).expect("deep copy");

        assert_ne!(copy.id, original.id);
        assert!(copy.share_id.is_empty());
        assert!(!copy.is_shared);
        assert_eq!(copy.file_extension, "jpg");
        assert_eq!(query::resource_count(&conn).expect("count"), 2);
    }

    #[test]
    fn deep_copy_of_missing_resource_fails() {
        let conn = open_in_memory().expect("open store");
        assert!(deep_copy(&conn, None, &"0".repeat(32)).is_err());
    }

    #[test]
    fn deep_copy_copies_the_backing_file() {
        let conn = open_in_memory().expect("open store");
        let dir = tempfile::tempdir().expect("create temp dir");

        let original = create(
            &conn,
            Resource {
                file_extension: "png".into(),
                ..Default::default()
            },
        )
        .expect("create resource");
        std::fs::write(dir.path().join(original.filename()), b"pixels").expect("write file");

        let copy = deep_copy(&conn, Some(dir.path()), &original.id).expect("deep copy");

        let bytes = std::fs::read(dir.path().join(copy.filename())).expect("read copy");
        assert_eq!(bytes, b"pixels");
        assert!(load(&conn, &copy.id).expect("load").is_some());
    }
}
