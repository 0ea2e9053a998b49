//! The [`TagWorld`] is an in-memory host for tagged entities. It owns the
//! entity allocator and one tag list per live entity, and plugs into the
//! codec through [`TagSource`].

use std::collections::HashMap;

use crate::entity::{EntityAllocator, EntityId};
use crate::source::{self, TagSource};
use crate::tag::Tag;
use crate::{KeyValuePairs, TagError};

/// Entities and their tag lists.
#[derive(Debug, Default)]
pub struct TagWorld {
    pub(crate) allocator: EntityAllocator,
    /// Tag lists indexed by entity index. Dead slots hold `None`.
    pub(crate) slots: Vec<Option<Vec<Tag>>>,
}

impl TagWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an entity owning `tags`, in the given order.
    pub fn spawn<I, T>(&mut self, tags: I) -> EntityId
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        let id = self.allocator.allocate();
        let idx = id.index() as usize;
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        self.slots[idx] = Some(tags.into_iter().map(Into::into).collect());
        tracing::trace!(entity = %id, "spawned tagged entity");
        id
    }

    /// Despawn an entity, returning the tags it owned.
    pub fn despawn(&mut self, id: EntityId) -> Result<Vec<Tag>, TagError> {
        if !self.allocator.deallocate(id) {
            return Err(TagError::StaleEntity { entity: id });
        }
        self.slots
            .get_mut(id.index() as usize)
            .and_then(Option::take)
            .ok_or(TagError::StaleEntity { entity: id })
    }

    /// Returns `true` if `id` refers to a live entity.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// The tag list of a live entity.
    pub fn tags(&self, id: EntityId) -> Result<&[Tag], TagError> {
        if !self.allocator.is_alive(id) {
            return Err(TagError::StaleEntity { entity: id });
        }
        self.slots
            .get(id.index() as usize)
            .and_then(Option::as_deref)
            .ok_or(TagError::StaleEntity { entity: id })
    }

    /// Mutable tag list of a live entity.
    ///
    /// The returned `Vec<Tag>` implements [`Tagged`](crate::source::Tagged),
    /// so entity-level codec operations chain directly off it.
    pub fn tags_mut(&mut self, id: EntityId) -> Result<&mut Vec<Tag>, TagError> {
        if !self.allocator.is_alive(id) {
            return Err(TagError::StaleEntity { entity: id });
        }
        self.slots
            .get_mut(id.index() as usize)
            .and_then(Option::as_mut)
            .ok_or(TagError::StaleEntity { entity: id })
    }

    /// Append a tag to a live entity's list.
    pub fn push_tag(&mut self, id: EntityId, tag: impl Into<Tag>) -> Result<(), TagError> {
        self.tags_mut(id)?.push(tag.into());
        Ok(())
    }

    /// Live entities with their tags, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &[Tag])> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            let tags = slot.as_deref()?;
            let id = self.allocator.alive_id(idx as u32)?;
            Some((id, tags))
        })
    }

    /// Key-value pairs of `tag_type` for every entity that has any.
    pub fn collect_key_value_pairs(&self, tag_type: &str) -> HashMap<EntityId, KeyValuePairs> {
        source::collect_key_value_pairs(self, tag_type)
    }
}

impl TagSource for TagWorld {
    type Handle = EntityId;

    fn tagged_entities(&self) -> Box<dyn Iterator<Item = (EntityId, &[Tag])> + '_> {
        Box::new(self.iter())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
