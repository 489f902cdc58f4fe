//! Body text scanning for internal item links.
//!
//! Note bodies reference other items (notes, resources) with the
//! internal link form `:/<32-hex id>`, e.g.
//! `![photo](:/06894e83b8f84d3d8cbe0f1587f9e226)`. Rendering, export and
//! duplication all need the set of referenced ids.

use regex::Regex;
use std::sync::OnceLock;

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r":/([0-9a-fA-F]{32})").unwrap_or_else(|e| panic!("internal link regex: {e}"))
    })
}

/// Ids referenced by internal links in `body`, in order of first
/// occurrence, deduplicated, lowercased.
#[must_use]
pub fn linked_item_ids(body: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for capture in link_re().captures_iter(body) {
        let id = capture[1].to_ascii_lowercase();
        if seen.insert(id.clone()) {
            out.push(id);
        }
    }
    out
}

/// The internal markdown link tag for an item: `[title](:/id)`.
#[must_use]
pub fn internal_link(title: &str, id: &str) -> String {
    format!("[{title}](:/{id})")
}

#[cfg(test)]
mod tests {
    use super::{internal_link, linked_item_ids};

    #[test]
    fn finds_ids_in_order_without_duplicates() {
        let cases: &[(&str, &[&str])] = &[
            ("[](:/06894e83b8f84d3d8cbe0f1587f9e226)", &["06894e83b8f84d3d8cbe0f1587f9e226"]),
            (
                "[](:/06894e83b8f84d3d8cbe0f1587f9e226) [](:/06894e83b8f84d3d8cbe0f1587f9e226)",
                &["06894e83b8f84d3d8cbe0f1587f9e226"],
            ),
            (
                "[](:/06894e83b8f84d3d8cbe0f1587f9e226) [](:/06894e83b8f84d3d8cbe0f1587f9e227)",
                &[
                    "06894e83b8f84d3d8cbe0f1587f9e226",
                    "06894e83b8f84d3d8cbe0f1587f9e227",
                ],
            ),
            (
                "[](:/06894e83b8f84d3d8cbe0f1587f9e226 \"some title\")",
                &["06894e83b8f84d3d8cbe0f1587f9e226"],
            ),
            ("no links here", &[]),
            // Too short to be an id.
            ("[](:/abc123)", &[]),
        ];

        for (input, expected) in cases {
            assert_eq!(&linked_item_ids(input), expected, "input: {input}");
        }
    }

    #[test]
    fn html_embeds_are_found_too() {
        let body = r#"<img alt="bla" src=":/06894e83b8f84d3d8cbe0f1587f9e226"/>"#;
        assert_eq!(
            linked_item_ids(body),
            vec!["06894e83b8f84d3d8cbe0f1587f9e226"]
        );
    }

    #[test]
    fn uppercase_ids_normalize_to_lowercase() {
        let body = "[](:/06894E83B8F84D3D8CBE0F1587F9E226)";
        assert_eq!(
            linked_item_ids(body),
            vec!["06894e83b8f84d3d8cbe0f1587f9e226"]
        );
    }

    #[test]
    fn link_tag_round_trips_through_scanner() {
        let tag = internal_link("ma note", "06894e83b8f84d3d8cbe0f1587f9e226");
        assert_eq!(
            linked_item_ids(&tag),
            vec!["06894e83b8f84d3d8cbe0f1587f9e226"]
        );
    }
}
