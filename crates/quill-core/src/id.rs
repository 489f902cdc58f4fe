//! Item identifiers.
//!
//! Every row (note, folder, tag, resource) is keyed by a 32-character
//! lowercase hex string. Ids are random, not content-derived, so two
//! items with identical fields still get distinct identities.

/// Length in characters of every item id.
pub const ID_LENGTH: usize = 32;

/// Generate a fresh random item id.
#[must_use]
pub fn generate() -> String {
    format!("{:032x}", rand::random::<u128>())
}

/// True when `id` has the shape of an item id (32 hex characters).
///
/// Accepts uppercase hex since bodies may carry ids typed by hand;
/// storage always uses the lowercase form.
#[must_use]
pub fn is_valid(id: &str) -> bool {
    id.len() == ID_LENGTH && id.chars().all(|c| c.is_ascii_hexdigit())
}
