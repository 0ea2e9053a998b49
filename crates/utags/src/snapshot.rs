//! World snapshot and restore support.
//!
//! Provides [`TagWorldSnapshot`] -- a serializable representation of a
//! [`TagWorld`] that can be captured, written out as JSON, and used to rebuild
//! the world exactly (entity IDs, allocator generations and every tag).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityAllocator, EntityId};
use crate::tag::Tag;
use crate::world::TagWorld;
use crate::TagError;

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// Serializable snapshot of the [`EntityAllocator`] state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatorSnapshot {
    /// Per-index generation counters.
    pub generations: Vec<u32>,
    /// Per-index alive flags.
    pub alive: Vec<bool>,
    /// Free-list indices (in FIFO order).
    pub free_indices: Vec<u32>,
}

/// One entity and its tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub entity_id: EntityId,
    pub tags: Vec<Tag>,
}

/// A complete, serializable snapshot of a [`TagWorld`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagWorldSnapshot {
    /// Allocator state (generations, alive flags, free list).
    pub allocator: AllocatorSnapshot,
    /// Every live entity, in index order.
    pub entities: Vec<EntitySnapshot>,
}

// ---------------------------------------------------------------------------
// TagWorld snapshot/restore impl
// ---------------------------------------------------------------------------

impl TagWorld {
    /// Capture the world state.
    pub fn capture_snapshot(&self) -> TagWorldSnapshot {
        let (generations, alive, free_indices) = self.allocator.snapshot_state();
        let entities = self
            .iter()
            .map(|(entity_id, tags)| EntitySnapshot {
                entity_id,
                tags: tags.to_vec(),
            })
            .collect();
        TagWorldSnapshot {
            allocator: AllocatorSnapshot {
                generations,
                alive,
                free_indices,
            },
            entities,
        }
    }

    /// Replace the world state with `snapshot`.
    ///
    /// The snapshot is validated before anything is touched, so on error the
    /// world is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::InvalidSnapshot`] when the allocator state is
    /// inconsistent or does not agree with the entity list.
    pub fn restore_from_snapshot(&mut self, snapshot: &TagWorldSnapshot) -> Result<(), TagError> {
        if let Err(err) = validate(snapshot) {
            tracing::warn!(error = %err, "rejecting tag world snapshot");
            return Err(err);
        }

        let alloc = &snapshot.allocator;
        let mut slots: Vec<Option<Vec<Tag>>> = vec![None; alloc.generations.len()];
        for entity in &snapshot.entities {
            slots[entity.entity_id.index() as usize] = Some(entity.tags.clone());
        }

        self.allocator = EntityAllocator::restore_from_snapshot(
            alloc.generations.clone(),
            alloc.alive.clone(),
            alloc.free_indices.clone(),
        );
        self.slots = slots;
        Ok(())
    }

    /// Build a new world from `snapshot`.
    pub fn from_snapshot(snapshot: &TagWorldSnapshot) -> Result<Self, TagError> {
        let mut world = Self::new();
        world.restore_from_snapshot(snapshot)?;
        Ok(world)
    }
}

fn invalid(details: String) -> TagError {
    TagError::InvalidSnapshot { details }
}

fn validate(snapshot: &TagWorldSnapshot) -> Result<(), TagError> {
    let alloc = &snapshot.allocator;
    if alloc.generations.len() != alloc.alive.len() {
        return Err(invalid(format!(
            "allocator snapshot inconsistent: {} generations vs {} alive flags",
            alloc.generations.len(),
            alloc.alive.len()
        )));
    }
    let alloc_len = alloc.generations.len();

    let mut seen_free = HashSet::new();
    for &free_idx in &alloc.free_indices {
        let idx = free_idx as usize;
        if idx >= alloc_len {
            return Err(invalid(format!(
                "allocator free index {free_idx} out of bounds (allocator has {alloc_len} slots)"
            )));
        }
        if alloc.alive[idx] {
            return Err(invalid(format!(
                "free list contains index {free_idx} which is marked alive"
            )));
        }
        if !seen_free.insert(free_idx) {
            return Err(invalid(format!("free list contains duplicate index {free_idx}")));
        }
    }

    // Every listed entity must sit in a live slot of the matching generation,
    // and every live slot must be listed exactly once.
    let mut seen_entities = HashSet::new();
    for entity in &snapshot.entities {
        let id = entity.entity_id;
        let idx = id.index() as usize;
        if idx >= alloc_len || !alloc.alive[idx] || alloc.generations[idx] != id.generation() {
            return Err(invalid(format!(
                "entity {id} is not alive in the allocator snapshot"
            )));
        }
        if !seen_entities.insert(id.index()) {
            return Err(invalid(format!("entity {id} is listed more than once")));
        }
    }
    let unlisted =
        (0..alloc_len).find(|&idx| alloc.alive[idx] && !seen_entities.contains(&(idx as u32)));
    if let Some(idx) = unlisted {
        return Err(invalid(format!(
            "allocator slot {idx} is marked alive but has no entity in snapshot"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
