//! Chunk data structure.

use std::sync::atomic::{AtomicU8, Ordering};

use tilestream_common::{ChunkOrigin, RenderTargetId};

/// Chunk width and height in tiles.
pub const CHUNK_TILES: usize = 16;

/// Number of tiles in one chunk.
pub const CHUNK_TILE_COUNT: usize = CHUNK_TILES * CHUNK_TILES;

/// Index into the tile palette.
pub type TileIndex = i32;

/// Generation state of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ChunkState {
    /// Tiles have not been filled yet.
    #[default]
    Ungenerated = 0,
    /// Tiles are filled but not yet drawn into a render target.
    Generated = 1,
    /// Tiles have been drawn into the chunk's render target.
    Cached = 2,
}

impl ChunkState {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Generated,
            2 => Self::Cached,
            _ => Self::Ungenerated,
        }
    }
}

/// One chunk of the world: a 16x16 grid of tile indices at a global origin.
///
/// The state tag is atomic so a renderer holding `&Chunk` can poll it while a
/// single producer advances it. Only one writer is assumed.
#[derive(Debug)]
pub struct Chunk {
    /// Global chunk coordinate
    origin: ChunkOrigin,
    /// Tile indices, row-major
    tiles: Box<[TileIndex; CHUNK_TILE_COUNT]>,
    /// Generation state
    state: AtomicU8,
    /// Pooled render target, if one is assigned
    render_target: Option<RenderTargetId>,
}

impl Chunk {
    /// Creates an ungenerated chunk at a global origin.
    #[must_use]
    pub fn new(origin: ChunkOrigin) -> Self {
        Self {
            origin,
            tiles: Box::new([0; CHUNK_TILE_COUNT]),
            state: AtomicU8::new(ChunkState::Ungenerated as u8),
            render_target: None,
        }
    }

    /// Returns the global chunk coordinate.
    #[must_use]
    pub const fn origin(&self) -> ChunkOrigin {
        self.origin
    }

    /// Returns the generation state.
    #[must_use]
    pub fn state(&self) -> ChunkState {
        ChunkState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Publishes a new generation state.
    pub fn set_state(&self, state: ChunkState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Returns the assigned render target.
    #[must_use]
    pub const fn render_target(&self) -> Option<RenderTargetId> {
        self.render_target
    }

    /// Assigns a render target, returning the previous one.
    pub fn set_render_target(&mut self, target: Option<RenderTargetId>) -> Option<RenderTargetId> {
        std::mem::replace(&mut self.render_target, target)
    }

    /// Takes the render target out of the chunk.
    pub fn take_render_target(&mut self) -> Option<RenderTargetId> {
        self.render_target.take()
    }

    /// Gets a tile at local coordinates.
    #[must_use]
    pub fn tile(&self, x: usize, y: usize) -> Option<TileIndex> {
        if x >= CHUNK_TILES || y >= CHUNK_TILES {
            return None;
        }
        Some(self.tiles[y * CHUNK_TILES + x])
    }

    /// Sets a tile at local coordinates.
    pub fn set_tile(&mut self, x: usize, y: usize, tile: TileIndex) -> bool {
        if x >= CHUNK_TILES || y >= CHUNK_TILES {
            return false;
        }
        self.tiles[y * CHUNK_TILES + x] = tile;
        true
    }

    /// Returns all tiles, row-major.
    #[must_use]
    pub fn tiles(&self) -> &[TileIndex; CHUNK_TILE_COUNT] {
        &self.tiles
    }

    /// Returns all tiles mutably, row-major.
    pub fn tiles_mut(&mut self) -> &mut [TileIndex; CHUNK_TILE_COUNT] {
        &mut self.tiles
    }
}
