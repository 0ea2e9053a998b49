//! Command handlers. Each one works on an in-memory [`TagWorld`] and returns
//! the text to print; file I/O stays in [`load_world`] and [`save_world`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use utags::prelude::*;

/// Read a JSON snapshot file into a world.
pub fn load_world(path: &Path) -> Result<TagWorld> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot: TagWorldSnapshot = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a tag world snapshot", path.display()))?;
    let world = TagWorld::from_snapshot(&snapshot)
        .with_context(|| format!("failed to restore {}", path.display()))?;
    tracing::debug!(path = %path.display(), entities = world.entity_count(), "loaded tag world");
    Ok(world)
}

/// Write a world out as a pretty-printed JSON snapshot.
pub fn save_world(world: &TagWorld, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&world.capture_snapshot())
        .context("failed to serialize tag world")?;
    fs::write(path, json + "\n").with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "saved tag world");
    Ok(())
}

#[derive(Debug, Serialize)]
struct EntityPairs {
    entity: String,
    pairs: KeyValuePairs,
}

/// JSON list of `{ entity, pairs }`, ordered by entity.
pub fn pairs(world: &TagWorld, tag_type: &str) -> Result<String> {
    let ordered: BTreeMap<EntityId, KeyValuePairs> =
        world.collect_key_value_pairs(tag_type).into_iter().collect();
    let entries: Vec<EntityPairs> = ordered
        .into_iter()
        .map(|(entity, pairs)| EntityPairs {
            entity: entity.to_string(),
            pairs,
        })
        .collect();
    serde_json::to_string_pretty(&entries).context("failed to serialize key-value pairs")
}

pub fn index(world: &TagWorld, entity: EntityId, tag_type: &str) -> Result<String> {
    let tags = world.tags(entity)?;
    Ok(match tags.tag_type_index(tag_type) {
        Some(index) => index.to_string(),
        None => "none".to_owned(),
    })
}

pub fn has(world: &TagWorld, entity: EntityId, tag_type: &str, key: &str) -> Result<bool> {
    Ok(world.tags(entity)?.has_key(tag_type, key))
}

pub fn get(world: &TagWorld, entity: EntityId, tag_type: &str, key: &str) -> Result<String> {
    Ok(world.tags(entity)?.key_value(tag_type, key).to_owned())
}

/// Returns whether the entity's tag was rewritten.
pub fn set(
    world: &mut TagWorld,
    entity: EntityId,
    tag_type: &str,
    key: &str,
    value: &str,
    replace_existing: bool,
) -> Result<bool> {
    let changed = world
        .tags_mut(entity)?
        .add_key_value(tag_type, key, value, replace_existing);
    tracing::info!(%entity, tag_type, key, value, changed, "set key-value pair");
    Ok(changed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
