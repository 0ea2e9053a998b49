//! Capability traits for hosts that own tags.
//!
//! The codec does not know about any particular engine. A host exposes an
//! entity's tag list through [`Tagged`] and its set of entities through
//! [`TagSource`]; the entity-level and world-level operations are built on
//! those two seams.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::codec;
use crate::tag::Tag;
use crate::KeyValuePairs;

// ---------------------------------------------------------------------------
// Tagged
// ---------------------------------------------------------------------------

/// Something that owns an ordered list of tags, usually an entity.
///
/// Only [`tags`](Tagged::tags) and [`tags_mut`](Tagged::tags_mut) need
/// implementing; the rest delegate to [`codec`].
pub trait Tagged {
    /// The tag list, in order.
    fn tags(&self) -> &[Tag];

    /// Mutable access to the tags. Mutations rewrite one element in place.
    fn tags_mut(&mut self) -> &mut [Tag];

    /// See [`codec::tag_type_index`].
    fn tag_type_index(&self, tag_type: &str) -> Option<usize> {
        codec::tag_type_index(self.tags(), tag_type)
    }

    /// See [`codec::key_value_pairs`].
    fn key_value_pairs(&self, tag_type: &str) -> KeyValuePairs {
        codec::key_value_pairs(self.tags(), tag_type)
    }

    /// See [`codec::has_key`].
    fn has_key(&self, tag_type: &str, key: &str) -> bool {
        codec::has_key(self.tags(), tag_type, key)
    }

    /// See [`codec::key_value`].
    fn key_value(&self, tag_type: &str, key: &str) -> &str {
        codec::key_value(self.tags(), tag_type, key)
    }

    /// See [`codec::add_key_value`].
    fn add_key_value(
        &mut self,
        tag_type: &str,
        key: &str,
        value: &str,
        replace_existing: bool,
    ) -> bool {
        codec::add_key_value(self.tags_mut(), tag_type, key, value, replace_existing)
    }
}

impl Tagged for [Tag] {
    fn tags(&self) -> &[Tag] {
        self
    }

    fn tags_mut(&mut self) -> &mut [Tag] {
        self
    }
}

impl Tagged for Vec<Tag> {
    fn tags(&self) -> &[Tag] {
        self
    }

    fn tags_mut(&mut self) -> &mut [Tag] {
        self
    }
}

// ---------------------------------------------------------------------------
// TagSource
// ---------------------------------------------------------------------------

/// A world-like container that can enumerate its entities' tags.
pub trait TagSource {
    /// Handle identifying one entity of the container.
    type Handle: Copy + Eq + Hash;

    /// Every entity of the container with its tag list.
    fn tagged_entities(&self) -> Box<dyn Iterator<Item = (Self::Handle, &[Tag])> + '_>;
}

/// Key-value pairs of `tag_type` for every entity of `source` that has any.
///
/// Entities whose parsed map is empty (no tag of the type, or no valid
/// fragment) are left out.
pub fn collect_key_value_pairs<S>(source: &S, tag_type: &str) -> HashMap<S::Handle, KeyValuePairs>
where
    S: TagSource + ?Sized,
{
    source
        .tagged_entities()
        .filter_map(|(handle, tags)| {
            let pairs = codec::key_value_pairs(tags, tag_type);
            (!pairs.is_empty()).then_some((handle, pairs))
        })
        .collect()
}

impl<H, S> TagSource for HashMap<H, Vec<Tag>, S>
where
    H: Copy + Eq + Hash,
    S: BuildHasher,
{
    type Handle = H;

    fn tagged_entities(&self) -> Box<dyn Iterator<Item = (H, &[Tag])> + '_> {
        Box::new(self.iter().map(|(handle, tags)| (*handle, tags.as_slice())))
    }
}

impl<H> TagSource for BTreeMap<H, Vec<Tag>>
where
    H: Copy + Eq + Hash + Ord,
{
    type Handle = H;

    fn tagged_entities(&self) -> Box<dyn Iterator<Item = (H, &[Tag])> + '_> {
        Box::new(self.iter().map(|(handle, tags)| (*handle, tags.as_slice())))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
