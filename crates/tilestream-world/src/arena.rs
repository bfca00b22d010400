//! Arena storage for chunks addressed by generational keys.

use tilestream_common::{ChunkKey, WorldError, WorldResult};

use crate::chunk::Chunk;

#[derive(Debug)]
struct Slot {
    generation: u32,
    chunk: Option<Chunk>,
}

/// Arena-based chunk storage.
///
/// Uses a free list for O(1) insertion and removal. Removing a chunk bumps
/// its slot's generation so outstanding keys to it stop resolving.
#[derive(Debug, Default)]
pub struct ChunkArena {
    /// Storage slots
    slots: Vec<Slot>,
    /// Free slot indices for reuse
    free_list: Vec<u32>,
    /// Number of live chunks
    len: usize,
}

impl ChunkArena {
    /// Creates a new empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new arena with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Returns the number of live chunks.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if there are no live chunks.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores a chunk and returns its key.
    pub fn insert(&mut self, chunk: Chunk) -> ChunkKey {
        self.len += 1;

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.chunk = Some(chunk);
            return ChunkKey::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            chunk: Some(chunk),
        });
        ChunkKey::new(index, 0)
    }

    /// Removes a chunk, returning it.
    pub fn remove(&mut self, key: ChunkKey) -> WorldResult<Chunk> {
        let slot = self
            .slots
            .get_mut(key.index() as usize)
            .filter(|slot| slot.generation == key.generation())
            .ok_or(WorldError::StaleChunkKey(key))?;

        let chunk = slot.chunk.take().ok_or(WorldError::StaleChunkKey(key))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(key.index());
        self.len -= 1;
        Ok(chunk)
    }

    /// Gets a chunk by key.
    #[must_use]
    pub fn get(&self, key: ChunkKey) -> Option<&Chunk> {
        self.slots
            .get(key.index() as usize)
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.chunk.as_ref())
    }

    /// Gets a chunk mutably by key.
    pub fn get_mut(&mut self, key: ChunkKey) -> Option<&mut Chunk> {
        self.slots
            .get_mut(key.index() as usize)
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.chunk.as_mut())
    }

    /// Checks if a key names a live chunk.
    #[must_use]
    pub fn contains(&self, key: ChunkKey) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over all live chunks with their keys.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkKey, &Chunk)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.chunk
                .as_ref()
                .map(|chunk| (ChunkKey::new(index as u32, slot.generation), chunk))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilestream_common::ChunkOrigin;

    #[test]
    fn test_insert_and_get() {
        let mut arena = ChunkArena::new();
        let key = arena.insert(Chunk::new(ChunkOrigin::new(1, 2)));

        assert_eq!(arena.len(), 1);
        assert!(arena.contains(key));
        assert_eq!(
            arena.get(key).map(Chunk::origin),
            Some(ChunkOrigin::new(1, 2))
        );
    }

    #[test]
    fn test_remove_invalidates_key() {
        let mut arena = ChunkArena::new();
        let key = arena.insert(Chunk::new(ChunkOrigin::ZERO));

        let chunk = arena.remove(key).expect("chunk should exist");
        assert_eq!(chunk.origin(), ChunkOrigin::ZERO);
        assert!(arena.is_empty());
        assert!(arena.get(key).is_none());
        assert!(matches!(
            arena.remove(key),
            Err(WorldError::StaleChunkKey(k)) if k == key
        ));
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut arena = ChunkArena::new();
        let old = arena.insert(Chunk::new(ChunkOrigin::ZERO));
        arena.remove(old).expect("chunk should exist");

        let new = arena.insert(Chunk::new(ChunkOrigin::new(5, 5)));
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());
        assert!(arena.get(old).is_none());
        assert!(arena.get(new).is_some());
    }

    #[test]
    fn test_iter_skips_free_slots() {
        let mut arena = ChunkArena::with_capacity(3);
        let a = arena.insert(Chunk::new(ChunkOrigin::new(0, 0)));
        let b = arena.insert(Chunk::new(ChunkOrigin::new(1, 0)));
        arena.insert(Chunk::new(ChunkOrigin::new(2, 0)));
        arena.remove(a).expect("chunk should exist");

        let keys: Vec<_> = arena.iter().map(|(key, _)| key).collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&b));
    }

    #[test]
    fn test_out_of_range_key() {
        let mut arena = ChunkArena::new();
        let bogus = ChunkKey::new(42, 0);
        assert!(arena.get(bogus).is_none());
        assert!(arena.get_mut(bogus).is_none());
        assert!(arena.remove(bogus).is_err());
    }
}
