//! Bidirectional rewriting between internal resource links and
//! external paths/URLs.
//!
//! Forward ([`replace_internal_to_external_links`]): every `:/<id>`
//! whose id names a known resource becomes either a relative path
//! (`<dir name>/<id>.<ext>`) or an absolute `file://` URL. Absolute
//! URLs percent-encode the directory portion and carry a cache-busting
//! `?t=<updated time>` for image resources, so editors re-render an
//! image when its bytes change.
//!
//! Reverse ([`replace_external_to_internal_links`]): the exact inverse
//! for anything the forward pass can produce, including Windows
//! drive-letter paths and directories with spaces or non-ASCII
//! characters. Two guards keep it from mangling unrelated text: the
//! filename stem must be a 32-hex id, and a relative `<dir name>/…`
//! occurrence is only rewritten at a link boundary, never in the middle
//! of a longer path. The app-link scheme `quill://<id>` also folds back
//! to `:/<id>`.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::{Captures, Regex};
use rusqlite::Connection;

use quill_core::db::query;
use quill_core::markdown;

/// Characters percent-encoded in the directory portion of absolute
/// URLs. Space and parentheses would terminate a markdown link target;
/// `%`, `?` and `#` would make decoding ambiguous. All non-ASCII bytes
/// are always encoded.
const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'(')
    .add(b')')
    .add(b'"')
    .add(b'%')
    .add(b'?')
    .add(b'#');

/// Where resource files live.
#[derive(Debug, Clone)]
pub struct ResourcePaths {
    /// Absolute path of the resource directory.
    pub resource_dir: std::path::PathBuf,
    /// Directory name used in relative links, e.g. `resources`.
    pub resource_dir_name: String,
}

impl ResourcePaths {
    #[must_use]
    pub fn new(resource_dir: impl Into<std::path::PathBuf>, dir_name: impl Into<String>) -> Self {
        Self {
            resource_dir: resource_dir.into(),
            resource_dir_name: dir_name.into(),
        }
    }

    /// The resource directory with forward slashes, as used in URLs on
    /// every platform.
    fn dir_forward_slashes(&self) -> String {
        forward_slashes(&self.resource_dir)
    }
}

/// Options shared by both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteOptions {
    /// Produce/consume absolute `file://` URLs instead of paths
    /// relative to the profile directory.
    pub use_absolute_paths: bool,
}

fn forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// `file://` for paths that already start with a slash, `file:///` for
/// drive-letter style paths, so the URL always has three slashes.
fn file_protocol(dir: &str) -> &'static str {
    if dir.starts_with('/') { "file://" } else { "file:///" }
}

// ---------------------------------------------------------------------------
// Internal -> external
// ---------------------------------------------------------------------------

/// Rewrite every internal resource link in `body` to its external
/// form. Ids that name no known resource are left untouched. Repeated
/// references to one resource are each rewritten, to identical output.
pub fn replace_internal_to_external_links(
    conn: &Connection,
    paths: &ResourcePaths,
    body: &str,
    options: RewriteOptions,
) -> Result<String> {
    let mut out = body.to_string();
    let mut rewritten = 0usize;

    for id in markdown::linked_item_ids(body) {
        let Some(resource) = query::get_resource(conn, &id)? else {
            continue;
        };
        rewritten += 1;

        let target = if options.use_absolute_paths {
            let dir = paths.dir_forward_slashes();
            let escaped = utf8_percent_encode(&dir, PATH_ESCAPE).to_string();
            let mut url = format!(
                "{}{escaped}/{}",
                file_protocol(&dir),
                resource.filename()
            );
            if resource.is_image() {
                let _ = write!(url, "?t={}", resource.updated_time);
            }
            url
        } else {
            format!("{}/{}", paths.resource_dir_name, resource.filename())
        };

        let re = Regex::new(&format!("(?i):/{}", regex::escape(&id)))
            .context("compile internal link pattern")?;
        out = re
            .replace_all(&out, |_: &Captures<'_>| target.clone())
            .into_owned();
    }

    tracing::debug!(
        resources = rewritten,
        absolute = options.use_absolute_paths,
        "rewrote internal links to external form"
    );
    Ok(out)
}

// ---------------------------------------------------------------------------
// External -> internal
// ---------------------------------------------------------------------------

/// Rewrite every external resource reference in `body` back to the
/// internal `:/<id>` form, stripping any cache-busting parameter, and
/// fold `quill://<id>` app links into `:/<id>`.
pub fn replace_external_to_internal_links(
    paths: &ResourcePaths,
    body: &str,
    options: RewriteOptions,
) -> Result<String> {
    let mut out = body.to_string();

    if options.use_absolute_paths {
        let dir = paths.dir_forward_slashes();
        let escaped = utf8_percent_encode(&dir, PATH_ESCAPE).to_string();

        let mut bases = vec![format!("file://{dir}"), format!("file:///{dir}")];
        if escaped != dir {
            bases.push(format!("file://{escaped}"));
            bases.push(format!("file:///{escaped}"));
        }

        for base in &bases {
            out = rewrite_absolute(&out, base)?;
        }
    } else {
        out = rewrite_relative(&out, &paths.resource_dir_name)?;
    }

    let app_link = Regex::new(r"\(quill://([0-9a-fA-F]{32})\)")
        .context("compile app-link pattern")?;
    out = app_link.replace_all(&out, "(:/$1)").into_owned();

    Ok(out)
}

fn rewrite_absolute(body: &str, base: &str) -> Result<String> {
    let re = Regex::new(&format!(
        r"{}/([0-9a-fA-F]{{32}})(\.[A-Za-z0-9]+)?(\?t=[0-9]+)?",
        regex::escape(base)
    ))
    .context("compile absolute base pattern")?;

    Ok(re
        .replace_all(body, |caps: &Captures<'_>| {
            format!(":/{}", caps[1].to_ascii_lowercase())
        })
        .into_owned())
}

fn rewrite_relative(body: &str, dir_name: &str) -> Result<String> {
    // A bare `<dir name>/` occurrence inside a longer path (e.g.
    // `file:///c:/foo/<dir name>/docs`) must survive unchanged, so the
    // match is anchored to a link boundary.
    let re = Regex::new(&format!(
        r#"(^|[\s('"=]){}/([0-9a-fA-F]{{32}})(\.[A-Za-z0-9]+)?(\?t=[0-9]+)?"#,
        regex::escape(dir_name)
    ))
    .context("compile relative base pattern")?;

    Ok(re
        .replace_all(body, |caps: &Captures<'_>| {
            format!("{}:/{}", &caps[1], caps[2].to_ascii_lowercase())
        })
        .into_owned())
}
