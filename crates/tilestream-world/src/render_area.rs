//! Square rings of chunk slots around a window origin.
//!
//! A [`RenderArea`] of view distance `s` covers the `(2s + 1)^2` relative
//! cells `[-s, s] x [-s, s]`, split into `s + 1` [`RenderLoop`]s. Loop `i`
//! holds exactly the cells whose Chebyshev distance from the centre is `i`.
//! Slots store [`ChunkKey`]s; the chunks themselves live elsewhere.

use ahash::AHashMap;
use tilestream_common::{ChunkKey, ChunkOrigin};

/// One square ring of chunk slots at a fixed Chebyshev distance.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    /// Ring radius
    size: u32,
    /// Slot contents keyed by relative coordinate
    chunks: AHashMap<ChunkOrigin, Option<ChunkKey>>,
    /// Perimeter cells in ascending id order
    cells: Vec<ChunkOrigin>,
}

impl RenderLoop {
    /// Creates a ring of radius `size` with every perimeter slot empty.
    #[must_use]
    pub fn new(size: u32) -> Self {
        let bounds = size as i32;
        let mut cells = Vec::with_capacity(Self::perimeter_len(size));

        if size == 0 {
            cells.push(ChunkOrigin::ZERO);
        } else {
            for x in -bounds..=bounds {
                cells.push(ChunkOrigin::new(x, bounds));
                cells.push(ChunkOrigin::new(x, -bounds));
            }
            for y in (-bounds + 1)..bounds {
                cells.push(ChunkOrigin::new(bounds, y));
                cells.push(ChunkOrigin::new(-bounds, y));
            }
        }
        cells.sort_unstable();

        let chunks = cells.iter().map(|&cell| (cell, None)).collect();
        Self {
            size,
            chunks,
            cells,
        }
    }

    /// Number of cells on the perimeter of a ring with this radius.
    #[must_use]
    pub const fn perimeter_len(size: u32) -> usize {
        if size == 0 {
            1
        } else {
            8 * size as usize
        }
    }

    /// Returns the ring radius.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Returns the number of slots on this ring.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: every ring has at least one slot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Checks whether a relative coordinate lies on this ring.
    #[must_use]
    pub fn contains(&self, relative: ChunkOrigin) -> bool {
        relative.chebyshev_len() == self.size
    }

    /// Returns the chunk at a relative coordinate.
    ///
    /// Coordinates off this ring return `None`.
    #[must_use]
    pub fn get_chunk(&self, x: i32, y: i32) -> Option<ChunkKey> {
        let relative = ChunkOrigin::new(x, y);
        if !self.contains(relative) {
            return None;
        }
        self.chunks.get(&relative).copied().flatten()
    }

    /// Writes a slot. Coordinates off this ring are ignored.
    pub fn set_chunk(&mut self, x: i32, y: i32, chunk: Option<ChunkKey>) {
        let relative = ChunkOrigin::new(x, y);
        if !self.contains(relative) {
            return;
        }
        if let Some(slot) = self.chunks.get_mut(&relative) {
            *slot = chunk;
        }
    }

    /// Iterates over the ring's slots in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkOrigin, Option<ChunkKey>)> + '_ {
        self.cells
            .iter()
            .map(|cell| (*cell, self.chunks.get(cell).copied().flatten()))
    }
}

/// The full square window: rings of radius `0..=view_distance`.
#[derive(Debug, Clone)]
pub struct RenderArea {
    loops: Vec<RenderLoop>,
}

impl RenderArea {
    /// Creates an empty window with the given view distance.
    #[must_use]
    pub fn new(view_distance: u32) -> Self {
        Self {
            loops: (0..=view_distance).map(RenderLoop::new).collect(),
        }
    }

    /// Returns the view distance (radius of the outermost ring).
    #[must_use]
    pub fn view_distance(&self) -> u32 {
        (self.loops.len() - 1) as u32
    }

    /// Returns the rings, innermost first.
    #[must_use]
    pub fn loops(&self) -> &[RenderLoop] {
        &self.loops
    }

    /// Total number of slots in the window.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.loops.iter().map(RenderLoop::len).sum()
    }

    /// Number of slots currently holding a chunk.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.iter().filter(|(_, chunk)| chunk.is_some()).count()
    }

    fn ring_index(x: i32, y: i32) -> usize {
        ChunkOrigin::new(x, y).chebyshev_len() as usize
    }

    /// Returns the chunk at a relative coordinate, `None` outside the window.
    #[must_use]
    pub fn get_chunk(&self, x: i32, y: i32) -> Option<ChunkKey> {
        self.loops
            .get(Self::ring_index(x, y))
            .and_then(|ring| ring.get_chunk(x, y))
    }

    /// Writes a slot. Coordinates outside the window are ignored.
    pub fn set_chunk(&mut self, x: i32, y: i32, chunk: Option<ChunkKey>) {
        if let Some(ring) = self.loops.get_mut(Self::ring_index(x, y)) {
            ring.set_chunk(x, y, chunk);
        }
    }

    /// Takes the chunk out of a slot, leaving it empty.
    pub fn take_chunk(&mut self, x: i32, y: i32) -> Option<ChunkKey> {
        let chunk = self.get_chunk(x, y);
        self.set_chunk(x, y, None);
        chunk
    }

    /// Iterates over every slot, ring by ring from the centre outwards.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkOrigin, Option<ChunkKey>)> + '_ {
        self.loops.iter().flat_map(|ring| ring.iter())
    }
}
