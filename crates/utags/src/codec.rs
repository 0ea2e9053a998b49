//! Tag-collection level operations.
//!
//! These functions work on an entity's ordered tag list. Lookups scan from the
//! start and act on the first tag of the requested type; only
//! [`key_value_pairs`] reads every tag of that type.

use crate::tag::Tag;
use crate::KeyValuePairs;

/// Index of the first tag whose text starts with `tag_type`, ignoring ASCII
/// case. An empty `tag_type` matches no tag.
pub fn tag_type_index(tags: &[Tag], tag_type: &str) -> Option<usize> {
    tags.iter().position(|tag| tag.is_type(tag_type))
}

/// Parse the key-value pairs of every tag of `tag_type`.
///
/// Pairs from several matching tags are merged in order; a later pair wins
/// over an earlier one with the same key. Returns an empty map when no tag
/// has the type or none of its fragments parse.
pub fn key_value_pairs(tags: &[Tag], tag_type: &str) -> KeyValuePairs {
    let mut pairs = KeyValuePairs::new();
    for fragments in tags.iter().filter_map(|tag| tag.pairs(tag_type)) {
        for (key, value) in fragments {
            pairs.insert(key.to_owned(), value.to_owned());
        }
    }
    pairs
}

/// Returns `true` if the first tag of `tag_type` contains `key`.
pub fn has_key(tags: &[Tag], tag_type: &str, key: &str) -> bool {
    tag_type_index(tags, tag_type).is_some_and(|index| tags[index].has_key(key))
}

/// Value of `key` in the first tag of `tag_type`, or `""`.
pub fn key_value<'a>(tags: &'a [Tag], tag_type: &str, key: &str) -> &'a str {
    match tag_type_index(tags, tag_type) {
        Some(index) => tags[index].key_value(key),
        None => "",
    }
}

/// Add or replace `key` in the first tag of `tag_type`.
///
/// Returns `false` without touching anything when no tag has the type.
/// See [`Tag::add_key_value`] for the replace semantics.
pub fn add_key_value(
    tags: &mut [Tag],
    tag_type: &str,
    key: &str,
    value: &str,
    replace_existing: bool,
) -> bool {
    match tag_type_index(tags, tag_type) {
        Some(index) => tags[index].add_key_value(key, value, replace_existing),
        None => {
            tracing::debug!(tag_type, key, "no tag of this type, key-value pair not added");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
