//! Share permissions and change provenance.
//!
//! Read-only enforcement happens at the model layer: every mutating
//! operation takes an explicit [`ShareContext`] describing which shares
//! the current user may not write to, and a [`ChangeSource`] saying who
//! is asking. There is no ambient global state to consult.

use std::collections::HashSet;

/// Origin of a mutation.
///
/// Synchronization-origin writes may update items in read-only shares
/// (the remote is authoritative for them); user-origin writes may not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeSource {
    #[default]
    User,
    Sync,
}

impl ChangeSource {
    #[must_use]
    pub const fn is_sync(self) -> bool {
        matches!(self, Self::Sync)
    }
}

/// Which shares are read-only for the current user.
///
/// Built by the caller from whatever share/user service it talks to and
/// passed into lifecycle operations.
#[derive(Debug, Clone, Default)]
pub struct ShareContext {
    read_only_share_ids: HashSet<String>,
}

impl ShareContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context in which the given shares are read-only.
    #[must_use]
    pub fn with_read_only<I, S>(share_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            read_only_share_ids: share_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn mark_read_only(&mut self, share_id: impl Into<String>) {
        self.read_only_share_ids.insert(share_id.into());
    }

    /// True when `share_id` names a share the current user cannot write
    /// to. Unshared items (empty share id) are never read-only.
    #[must_use]
    pub fn is_read_only(&self, share_id: &str) -> bool {
        !share_id.is_empty() && self.read_only_share_ids.contains(share_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeSource, ShareContext};

    #[test]
    fn unshared_items_are_writable() {
        let ctx = ShareContext::with_read_only(["123456789"]);
        assert!(!ctx.is_read_only(""));
        assert!(ctx.is_read_only("123456789"));
        assert!(!ctx.is_read_only("other"));
    }

    #[test]
    fn default_context_is_permissive() {
        let ctx = ShareContext::new();
        assert!(!ctx.is_read_only("123456789"));
    }

    #[test]
    fn change_source_classification() {
        assert!(ChangeSource::Sync.is_sync());
        assert!(!ChangeSource::User.is_sync());
        assert_eq!(ChangeSource::default(), ChangeSource::User);
    }
}
