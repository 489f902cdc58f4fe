//! quill-links: resource-link rewriting for export, import and
//! editor display.
//!
//! Note bodies store attachments as internal links (`:/<32-hex id>`).
//! External representations — markdown files on disk, the WYSIWYG
//! editor — need real paths instead. This crate converts between the
//! two forms such that converting out and back reconstructs the
//! original body bit-for-bit.

pub mod rewrite;

pub use rewrite::{
    ResourcePaths, RewriteOptions, replace_external_to_internal_links,
    replace_internal_to_external_links,
};
