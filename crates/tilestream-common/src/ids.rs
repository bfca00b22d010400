//! Handle types for chunks and pooled graphics resources.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generational handle to a chunk stored in a caller-owned arena.
///
/// The streaming window stores these instead of owning chunks. A key stays
/// valid until the chunk it names is removed; after that the slot may be
/// reused under a new generation and the old key no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkKey {
    index: u32,
    generation: u32,
}

impl ChunkKey {
    /// Creates a key from a slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation (for detecting stale keys).
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk#{}v{}", self.index, self.generation)
    }
}

/// Index of a render target pair inside a fixed-size pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderTargetId(u32);

impl RenderTargetId {
    /// Creates a render target ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Opaque handle to a texture owned by the rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(u64);

impl TextureHandle {
    /// Creates a texture handle from a raw backend value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw backend value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}
