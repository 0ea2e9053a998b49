//! Single-tag view of the key-value format.
//!
//! A [`Tag`] is a plain text token laid out as
//! `"TagType:Key1,Value1;Key2,Value2;"`. Nothing structured is stored next to
//! the text: every query re-reads it, and every mutation rewrites it.
//!
//! Key lookups are substring matches over the raw text, not token matches. A
//! key that also occurs inside another key or a value is found at its first
//! occurrence, wherever that is. Existing tag data relies on this, so it is
//! kept as-is.
//!
//! Type prefixes and keys are matched ignoring ASCII case (`"semlog:"` is a
//! `"SemLog:"` tag). Parsed keys and values keep the case they were written
//! with.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{KEY_VALUE_DELIMITER, PAIR_DELIMITER};

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// A single text attribute attached to an entity.
///
/// Serializes as a bare JSON string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Wrap existing tag text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Render `tag_type` followed by one `key,value;` fragment per pair.
    ///
    /// ```
    /// use utags::tag::Tag;
    ///
    /// let tag = Tag::build("SemLog:", [("Class", "Cup"), ("Id", "a1")]);
    /// assert_eq!(tag.as_str(), "SemLog:Class,Cup;Id,a1;");
    /// ```
    pub fn build<I, K, V>(tag_type: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut text = String::from(tag_type);
        for (key, value) in pairs {
            push_fragment(&mut text, key.as_ref(), value.as_ref());
        }
        Self(text)
    }

    /// The raw tag text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the tag, returning its text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` if the text starts with `tag_type`, ignoring ASCII case.
    ///
    /// The prefix is otherwise matched literally, so callers pass any
    /// separator (`':'`) as part of it. An empty `tag_type` matches nothing.
    #[inline]
    pub fn is_type(&self, tag_type: &str) -> bool {
        strip_prefix_ignore_case(&self.0, tag_type).is_some()
    }

    /// Iterate the well-formed `(key, value)` fragments of this tag.
    ///
    /// Returns `None` when the tag is not of `tag_type`.
    pub fn pairs(&self, tag_type: &str) -> Option<Pairs<'_>> {
        strip_prefix_ignore_case(&self.0, tag_type).map(|payload| Pairs { rest: payload })
    }

    /// Returns `true` if `key` occurs anywhere in the tag text.
    ///
    /// An empty key is never present.
    pub fn has_key(&self, key: &str) -> bool {
        find_ignore_case(&self.0, key).is_some()
    }

    /// Value stored after the first occurrence of `key`.
    ///
    /// The value starts one character past the end of `key` (the `,`) and
    /// runs up to the next `;`. Returns `""` when the key is absent or no `;`
    /// terminates the value.
    pub fn key_value(&self, key: &str) -> &str {
        let Some(pos) = find_ignore_case(&self.0, key) else {
            return "";
        };

        let mut after_key = self.0[pos + key.len()..].chars();
        after_key.next();
        let rest = after_key.as_str();

        match rest.find(PAIR_DELIMITER) {
            Some(end) => &rest[..end],
            None => "",
        }
    }

    /// Add `key,value;` to the tag, or replace the value of an existing key.
    ///
    /// When the key already has a value and `replace_existing` is set, every
    /// occurrence of the old value text in the tag is replaced (ASCII case
    /// ignored), not just the one belonging to `key`.
    ///
    /// Returns `true` if the tag text was rewritten.
    pub fn add_key_value(&mut self, key: &str, value: &str, replace_existing: bool) -> bool {
        if key.is_empty() {
            tracing::debug!(tag = %self.0, "refusing to add a key-value pair with an empty key");
            return false;
        }

        let current = self.key_value(key);
        if current.is_empty() {
            tracing::trace!(tag = %self.0, key, value, "appending key-value pair");
            push_fragment(&mut self.0, key, value);
            true
        } else if replace_existing {
            tracing::trace!(tag = %self.0, key, old = current, new = value, "replacing value");
            self.0 = replace_ignore_case(&self.0, current, value);
            true
        } else {
            false
        }
    }
}

fn push_fragment(text: &mut String, key: &str, value: &str) {
    text.push_str(key);
    text.push(KEY_VALUE_DELIMITER);
    text.push_str(value);
    text.push(PAIR_DELIMITER);
}

// ---------------------------------------------------------------------------
// ASCII case-insensitive matching
// ---------------------------------------------------------------------------
//
// Bytes >= 0x80 only ever match themselves, so every match starts and ends on
// a char boundary of `text` and the slicing below cannot panic.

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let len = prefix.len();
    let head = text.as_bytes().get(..len)?;
    (len > 0 && head.eq_ignore_ascii_case(prefix.as_bytes())).then(|| &text[len..])
}

fn find_ignore_case(text: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    text.as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

fn replace_ignore_case(text: &str, from: &str, to: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = find_ignore_case(rest, from) {
        out.push_str(&rest[..pos]);
        out.push_str(to);
        rest = &rest[pos + from.len()..];
    }
    out.push_str(rest);
    out
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}

impl From<String> for Tag {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

// ---------------------------------------------------------------------------
// Pairs
// ---------------------------------------------------------------------------

/// Iterator over the `(key, value)` fragments of one tag's payload.
///
/// The payload is split at each `;`; text after the last `;` is not a
/// fragment. Each fragment is split at its first `,`. Fragments with no `,`,
/// an empty key, or an empty value are skipped.
#[derive(Debug, Clone)]
pub struct Pairs<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Pairs<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (fragment, rest) = self.rest.split_once(PAIR_DELIMITER)?;
            self.rest = rest;
            match fragment.split_once(KEY_VALUE_DELIMITER) {
                Some((key, value)) if !key.is_empty() && !value.is_empty() => {
                    return Some((key, value));
                }
                _ => tracing::trace!(fragment, "skipping malformed key-value fragment"),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_reads_value_after_key() {
        let tag = Tag::new("Foo:Bar,Baz;");
        assert_eq!(tag.key_value("Bar"), "Baz");
        assert_eq!(tag.key_value("Nope"), "");
    }

    #[test]
    fn key_value_without_terminator_is_empty() {
        let tag = Tag::new("Foo:Bar,Baz");
        assert_eq!(tag.key_value("Bar"), "");
    }

    #[test]
    fn key_value_at_end_of_text_is_empty() {
        let tag = Tag::new("Foo:Bar");
        assert_eq!(tag.key_value("Bar"), "");
        let tag = Tag::new("Foo:Bar,");
        assert_eq!(tag.key_value("Bar"), "");
    }

    #[test]
    fn key_value_matches_substring_of_another_key() {
        // "Id" is found inside "ClassId" first.
        let tag = Tag::new("SemLog:ClassId,7;Id,abc;");
        assert_eq!(tag.key_value("Id"), "7");
    }

    #[test]
    fn key_value_skips_exactly_one_character() {
        // "Ba" ends one character before the comma, so the comma is kept.
        let tag = Tag::new("Foo:Bar,Baz;");
        assert_eq!(tag.key_value("Ba"), ",Baz");
    }

    #[test]
    fn key_value_handles_multibyte_delimiter_position() {
        let tag = Tag::new("Foo:Kéy\u{e9}Väl;");
        assert_eq!(tag.key_value("Kéy"), "Väl");
    }

    #[test]
    fn has_key_is_a_substring_check() {
        let tag = Tag::new("Foo:Bar,Baz;");
        assert!(tag.has_key("Bar"));
        // Matches inside the value too.
        assert!(tag.has_key("az"));
        // And inside the type prefix.
        assert!(tag.has_key("Foo"));
        assert!(!tag.has_key("Qux"));
    }

    #[test]
    fn empty_key_is_never_present() {
        let mut tag = Tag::new("Foo:Bar,Baz;");
        assert!(!tag.has_key(""));
        assert_eq!(tag.key_value(""), "");
        assert!(!tag.add_key_value("", "v", true));
        assert_eq!(tag.as_str(), "Foo:Bar,Baz;");
    }

    #[test]
    fn add_key_value_appends_new_fragment() {
        let mut tag = Tag::new("Foo:");
        assert!(tag.add_key_value("X", "1", true));
        assert_eq!(tag.as_str(), "Foo:X,1;");
    }

    #[test]
    fn add_key_value_replaces_existing_value() {
        let mut tag = Tag::new("Foo:X,1;");
        assert!(tag.add_key_value("X", "2", true));
        assert_eq!(tag.key_value("X"), "2");
        assert_eq!(tag.as_str(), "Foo:X,2;");
    }

    #[test]
    fn add_key_value_keeps_existing_value_when_asked() {
        let mut tag = Tag::new("Foo:X,1;");
        assert!(!tag.add_key_value("X", "2", false));
        assert_eq!(tag.as_str(), "Foo:X,1;");
    }

    #[test]
    fn replace_rewrites_every_occurrence_of_old_value() {
        let mut tag = Tag::new("Foo:A,1;B,1;");
        assert!(tag.add_key_value("A", "9", true));
        assert_eq!(tag.as_str(), "Foo:A,9;B,9;");
    }

    #[test]
    fn replace_with_same_value_still_reports_change() {
        let mut tag = Tag::new("Foo:X,1;");
        assert!(tag.add_key_value("X", "1", true));
        assert_eq!(tag.as_str(), "Foo:X,1;");
    }

    #[test]
    fn key_with_empty_value_gets_duplicate_fragment() {
        let mut tag = Tag::new("Foo:X,;");
        assert!(tag.add_key_value("X", "5", false));
        assert_eq!(tag.as_str(), "Foo:X,;X,5;");
    }

    #[test]
    fn pairs_skip_malformed_fragments() {
        let tag = Tag::new("T:a,1;broken;,2;b,;c,3;trailing,4");
        let pairs: Vec<_> = tag.pairs("T:").unwrap().collect();
        assert_eq!(pairs, vec![("a", "1"), ("c", "3")]);
    }

    #[test]
    fn pairs_split_on_first_comma_only() {
        let tag = Tag::new("T:k,v,w;");
        let pairs: Vec<_> = tag.pairs("T:").unwrap().collect();
        assert_eq!(pairs, vec![("k", "v,w")]);
    }

    #[test]
    fn pairs_of_other_type_is_none() {
        let tag = Tag::new("T:k,v;");
        assert!(tag.pairs("U:").is_none());
    }

    #[test]
    fn build_renders_fragments() {
        let tag = Tag::build("T:", [("k1", "v1"), ("k2", "v2")]);
        assert_eq!(tag.to_string(), "T:k1,v1;k2,v2;");
    }

    #[test]
    fn type_prefix_ignores_ascii_case() {
        let tag = Tag::new("semlog:Class,Cup;");
        assert!(tag.is_type("SemLog:"));
        let pairs: Vec<_> = tag.pairs("SEMLOG:").unwrap().collect();
        assert_eq!(pairs, vec![("Class", "Cup")]);
    }

    #[test]
    fn empty_type_prefix_matches_nothing() {
        let tag = Tag::new("T:k,v;");
        assert!(!tag.is_type(""));
        assert!(tag.pairs("").is_none());
    }

    #[test]
    fn key_search_ignores_ascii_case() {
        let tag = Tag::new("Foo:Class,Cup;");
        assert!(tag.has_key("class"));
        assert!(tag.has_key("CLASS"));
        assert_eq!(tag.key_value("cLaSs"), "Cup");
    }

    #[test]
    fn case_folding_leaves_non_ascii_alone() {
        let tag = Tag::new("Foo:Äpfel,3;");
        assert_eq!(tag.key_value("Äpfel"), "3");
        assert!(!tag.has_key("äpfel"));
    }

    #[test]
    fn replace_ignores_ascii_case_of_old_value() {
        let mut tag = Tag::new("Foo:A,cup;B,CUP;");
        assert!(tag.add_key_value("a", "Mug", true));
        assert_eq!(tag.as_str(), "Foo:A,Mug;B,Mug;");
    }

    #[test]
    fn keep_existing_matches_key_in_any_case() {
        let mut tag = Tag::new("Foo:Id,7;");
        assert!(!tag.add_key_value("ID", "8", false));
        assert_eq!(tag.as_str(), "Foo:Id,7;");
    }

    #[test]
    fn tag_serializes_as_plain_string() {
        let tag = Tag::new("T:k,v;");
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, "\"T:k,v;\"");
        let back: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }
}
