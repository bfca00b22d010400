//! Fixed-size pool of chunk render targets.
//!
//! Every live chunk draws into one render target pair. The pool is built once
//! with as many pairs as the window has slots, so a correctly drained window
//! can never run it dry.

use tilestream_common::{RenderTargetId, TextureHandle, WorldError, WorldResult};
use tracing::{debug, warn};

/// Default render target edge length in pixels.
pub const DEFAULT_TEXTURE_SIZE: u32 = 256;

/// Backend hook for creating textures that chunks are drawn into.
pub trait TextureAllocator {
    /// Creates a square render texture.
    fn allocate(&mut self, width: u32, height: u32) -> TextureHandle;
}

/// Base and overlay layer for one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    /// Tile layer
    pub base: TextureHandle,
    /// Decoration layer drawn over the base
    pub overlay: TextureHandle,
}

/// Pool of render targets recycled through a free list.
#[derive(Debug)]
pub struct RenderTargetPool {
    targets: Vec<RenderTarget>,
    in_use: Vec<bool>,
    available: Vec<RenderTargetId>,
    texture_size: u32,
}

impl RenderTargetPool {
    /// Allocates `capacity` target pairs up front.
    pub fn new(capacity: usize, texture_size: u32, allocator: &mut dyn TextureAllocator) -> Self {
        let targets: Vec<_> = (0..capacity)
            .map(|_| RenderTarget {
                base: allocator.allocate(texture_size, texture_size),
                overlay: allocator.allocate(texture_size, texture_size),
            })
            .collect();

        debug!(
            "Allocated {} render targets of {}x{}",
            capacity, texture_size, texture_size
        );

        Self {
            targets,
            in_use: vec![false; capacity],
            available: (0..capacity as u32).map(RenderTargetId::new).collect(),
            texture_size,
        }
    }

    /// Returns the total number of targets.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.targets.len()
    }

    /// Returns the number of free targets.
    #[must_use]
    pub fn available(&self) -> usize {
        self.available.len()
    }

    /// Returns the texture edge length.
    #[must_use]
    pub const fn texture_size(&self) -> u32 {
        self.texture_size
    }

    /// Checks out a free target.
    pub fn acquire(&mut self) -> WorldResult<RenderTargetId> {
        let id = self.available.pop().ok_or_else(|| {
            warn!("Render target pool exhausted");
            WorldError::PoolExhausted {
                capacity: self.targets.len(),
            }
        })?;
        self.in_use[id.raw() as usize] = true;
        Ok(id)
    }

    /// Returns a target to the pool.
    pub fn release(&mut self, id: RenderTargetId) -> WorldResult<()> {
        match self.in_use.get_mut(id.raw() as usize) {
            Some(flag) if *flag => {
                *flag = false;
                self.available.push(id);
                Ok(())
            },
            _ => Err(WorldError::TargetNotInUse(id)),
        }
    }

    /// Looks up the textures behind a target.
    #[must_use]
    pub fn get(&self, id: RenderTargetId) -> Option<&RenderTarget> {
        self.targets.get(id.raw() as usize)
    }
}
