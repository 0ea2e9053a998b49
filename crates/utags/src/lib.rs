//! UTags -- key-value metadata encoded in entity tags.
//!
//! Engine entities carry an ordered list of plain text tags. This crate reads
//! and writes structured metadata stored inside one of those tags, laid out as
//!
//! ```text
//! TagType:Key1,Value1;Key2,Value2;Key3,Value3;
//! ```
//!
//! The work happens on three levels, each delegating to the next:
//!
//! - entity / world: [`Tagged`](source::Tagged) and
//!   [`TagSource`](source::TagSource) let any host expose its tags;
//!   [`TagWorld`](world::TagWorld) is an in-memory host.
//! - tag list: [`codec`] locates the tag of a type and parses or edits it.
//! - single tag: [`Tag`](tag::Tag) holds the text and the substring-level
//!   lookups.
//!
//! The codec never fails. Absence is reported as `None`, an empty map, an
//! empty string or `false`.
//!
//! # Quick Start
//!
//! ```
//! use utags::prelude::*;
//!
//! let mut world = TagWorld::new();
//! let cup = world.spawn(["Physics:", "SemLog:Class,Cup;"]);
//!
//! let tags = world.tags_mut(cup).unwrap();
//! assert!(tags.add_key_value("SemLog:", "Id", "a1", true));
//! assert_eq!(tags.key_value("SemLog:", "Class"), "Cup");
//!
//! let all = world.collect_key_value_pairs("SemLog:");
//! assert_eq!(all[&cup]["Id"], "a1");
//! ```

#![deny(unsafe_code)]

use std::collections::BTreeMap;

pub mod codec;
pub mod entity;
pub mod snapshot;
pub mod source;
pub mod tag;
pub mod world;

/// Separates `key,value` fragments inside a tag.
pub const PAIR_DELIMITER: char = ';';

/// Separates a key from its value inside a fragment.
pub const KEY_VALUE_DELIMITER: char = ',';

/// Parsed key-value pairs of one tag type. Ordered by key.
pub type KeyValuePairs = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by the entity host and snapshot layers.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// The entity does not exist (stale generation or never allocated).
    #[error("entity {entity:?} does not exist (stale or never allocated)")]
    StaleEntity { entity: entity::EntityId },

    /// A snapshot failed validation and was not applied.
    #[error("invalid tag world snapshot: {details}")]
    InvalidSnapshot { details: String },

    /// Text could not be parsed as an [`EntityId`](entity::EntityId).
    #[error("invalid entity id '{input}': expected '<index>v<generation>' or '<index>'")]
    ParseEntityId { input: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::codec;
    pub use crate::entity::EntityId;
    pub use crate::snapshot::{EntitySnapshot, TagWorldSnapshot};
    pub use crate::source::{collect_key_value_pairs, TagSource, Tagged};
    pub use crate::tag::Tag;
    pub use crate::world::TagWorld;
    pub use crate::{KeyValuePairs, TagError};
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn documented_tag_format_parses() {
        let tags = vec![Tag::from("TagType:Key1,Value1;Key2,Value2;Key3,Value3;")];
        let pairs = tags.key_value_pairs("TagType:");
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs["Key1"], "Value1");
        assert_eq!(pairs["Key3"], "Value3");
    }

    #[test]
    fn write_then_read_through_world() {
        let mut world = TagWorld::new();
        let table = world.spawn(["SemLog:"]);

        {
            let tags = world.tags_mut(table).unwrap();
            assert!(tags.add_key_value("SemLog:", "Class", "Table", true));
            assert!(tags.add_key_value("SemLog:", "Id", "t9", true));
            assert!(!tags.add_key_value("SemLog:", "Id", "t10", false));
        }

        let tags = world.tags(table).unwrap();
        assert_eq!(tags[0].as_str(), "SemLog:Class,Table;Id,t9;");
        assert!(tags.has_key("SemLog:", "Class"));
        assert_eq!(tags.key_value("SemLog:", "Id"), "t9");
    }

    #[test]
    fn mutation_can_create_duplicate_key_that_parser_collapses() {
        // "Id" first matches inside "ClassId", so the write lands there and
        // no "Id" fragment is ever added.
        let mut tags = vec![Tag::from("T:ClassId,7;")];
        assert_eq!(tags.key_value("T:", "Id"), "7");
        assert!(tags.add_key_value("T:", "Id", "8", true));
        assert_eq!(tags[0].as_str(), "T:ClassId,8;");

        // The first "K" has an empty value, so every write appends again.
        let mut tags = vec![Tag::from("T:K,;")];
        assert!(tags.add_key_value("T:", "K", "1", true));
        assert!(tags.add_key_value("T:", "K", "2", true));
        assert_eq!(tags[0].as_str(), "T:K,;K,1;K,2;");
        assert_eq!(tags.key_value_pairs("T:")["K"], "2");
    }

    #[test]
    fn error_messages_name_the_entity() {
        let err = TagError::StaleEntity {
            entity: EntityId::new(3, 1),
        };
        assert_eq!(
            err.to_string(),
            "entity EntityId(3v1) does not exist (stale or never allocated)"
        );
    }
}
