//! Origin tracking and window scrolling.
//!
//! [`RenderAreaManager`] anchors a [`RenderArea`] at a global origin. Moving
//! the origin scrolls the window: chunk keys are relocated to new relative
//! slots, keys that leave the window are queued as dead, and freshly exposed
//! slots are queued as undefined together with the global coordinate they
//! must be generated for.
//!
//! The manager never owns chunks. Callers drain both queues after each move
//! (see `WorldStreamer::refresh`).

use ahash::AHashMap;
use tilestream_common::{ChunkKey, ChunkOrigin};
use tracing::{debug, trace};

use crate::render_area::RenderArea;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    /// Builds a relative cell from a coordinate along the axis and one across it.
    const fn cell(self, along: i32, across: i32) -> ChunkOrigin {
        match self {
            Self::X => ChunkOrigin::new(along, across),
            Self::Y => ChunkOrigin::new(across, along),
        }
    }

    const fn along(self, cell: ChunkOrigin) -> i32 {
        match self {
            Self::X => cell.x,
            Self::Y => cell.y,
        }
    }
}

/// Scrolls a [`RenderArea`] as its global origin moves.
#[derive(Debug, Clone)]
pub struct RenderAreaManager {
    /// Window slots
    area: RenderArea,
    /// Global coordinate of the centre slot
    origin: ChunkOrigin,
    /// Relative slot -> global coordinate still to be generated
    undefined_chunks: AHashMap<ChunkOrigin, ChunkOrigin>,
    /// Keys that scrolled out of the window, in eviction order
    dead_chunks: Vec<ChunkKey>,
}

impl RenderAreaManager {
    /// Creates a manager with every slot undefined.
    #[must_use]
    pub fn new(view_distance: u32, origin: ChunkOrigin) -> Self {
        let area = RenderArea::new(view_distance);
        let undefined_chunks = area
            .iter()
            .map(|(relative, _)| (relative, origin + relative))
            .collect();

        debug!(
            "Creating render area manager with view_distance={}, origin={}",
            view_distance, origin
        );

        Self {
            area,
            origin,
            undefined_chunks,
            dead_chunks: Vec::new(),
        }
    }

    /// Returns the global coordinate of the centre slot.
    #[must_use]
    pub const fn origin(&self) -> ChunkOrigin {
        self.origin
    }

    /// Returns the view distance.
    #[must_use]
    pub fn view_distance(&self) -> u32 {
        self.area.view_distance()
    }

    /// Returns the window slots.
    #[must_use]
    pub const fn area(&self) -> &RenderArea {
        &self.area
    }

    /// Returns the window slots mutably.
    pub fn area_mut(&mut self) -> &mut RenderArea {
        &mut self.area
    }

    /// Slots waiting for a chunk, relative -> global.
    #[must_use]
    pub const fn undefined_chunks(&self) -> &AHashMap<ChunkOrigin, ChunkOrigin> {
        &self.undefined_chunks
    }

    /// Keys evicted from the window and not yet drained.
    #[must_use]
    pub fn dead_chunks(&self) -> &[ChunkKey] {
        &self.dead_chunks
    }

    /// Takes every pending undefined slot, sorted by relative coordinate.
    pub fn take_undefined_chunks(&mut self) -> Vec<(ChunkOrigin, ChunkOrigin)> {
        let mut pending: Vec<_> = self.undefined_chunks.drain().collect();
        pending.sort_unstable_by_key(|(relative, _)| *relative);
        pending
    }

    /// Takes every evicted key, in eviction order.
    pub fn drain_dead_chunks(&mut self) -> Vec<ChunkKey> {
        std::mem::take(&mut self.dead_chunks)
    }

    /// Puts undisposed keys back at the front of the dead queue.
    pub fn requeue_dead_chunks(&mut self, keys: &[ChunkKey]) {
        self.dead_chunks.splice(0..0, keys.iter().copied());
    }

    /// Places a chunk into a relative slot and clears its pending entry.
    ///
    /// Returns false if `relative` lies outside the window.
    pub fn install(&mut self, relative: ChunkOrigin, chunk: ChunkKey) -> bool {
        if relative.chebyshev_len() > self.view_distance() {
            return false;
        }
        self.area.set_chunk(relative.x, relative.y, Some(chunk));
        self.undefined_chunks.remove(&relative);
        true
    }

    /// Moves the origin by whole chunks: all X steps first, then all Y steps.
    ///
    /// Each unit step scrolls the window contents one slot opposite to the
    /// direction of travel. Dead keys are appended to [`Self::dead_chunks`];
    /// exposed slots are added to [`Self::undefined_chunks`].
    pub fn move_origin(&mut self, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }

        let dead_before = self.dead_chunks.len();

        let step_x = if dx > 0 {
            ChunkOrigin::RIGHT
        } else {
            ChunkOrigin::LEFT
        };
        self.shift(Axis::X, step_x, dx.unsigned_abs());

        let step_y = if dy > 0 {
            ChunkOrigin::DOWN
        } else {
            ChunkOrigin::UP
        };
        self.shift(Axis::Y, step_y, dy.unsigned_abs());

        debug!(
            "Moved origin by ({}, {}) to {}: {} evicted, {} undefined pending",
            dx,
            dy,
            self.origin,
            self.dead_chunks.len() - dead_before,
            self.undefined_chunks.len()
        );
    }

    /// Moves the origin `count` unit steps along `axis`.
    ///
    /// After `2 * view_distance + 1` steps the window holds no chunks, so the
    /// remaining steps only advance the origin and retarget pending slots.
    fn shift(&mut self, axis: Axis, step: ChunkOrigin, count: u32) {
        let width = 2 * self.view_distance() + 1;
        let stepped = count.min(width);
        for _ in 0..stepped {
            self.shift_once(axis, step);
        }

        let remaining = count - stepped;
        if remaining == 0 {
            return;
        }

        self.origin += step * remaining as i32;
        let origin = self.origin;
        for (relative, global) in &mut self.undefined_chunks {
            *global = origin + *relative;
        }
        trace!(
            "Skipped {} steps on an empty window, origin now {}",
            remaining,
            self.origin
        );
    }

    /// One unit step of the origin along `axis` in direction `step`.
    fn shift_once(&mut self, axis: Axis, step: ChunkOrigin) {
        let size = self.view_distance() as i32;
        let direction = axis.along(step);
        let trailing = -size * direction;
        let leading = size * direction;

        // pending slots travel with the content; those falling off are dropped
        let pending = std::mem::take(&mut self.undefined_chunks);
        self.undefined_chunks.reserve(pending.len());
        for (relative, global) in pending {
            if axis.along(relative) == trailing {
                trace!("Dropping ungenerated slot {} for {}", relative, global);
                continue;
            }
            self.undefined_chunks.insert(relative - step, global);
        }

        for across in -size..=size {
            // walk from the trailing edge so every target slot is already vacated
            let mut along = trailing;
            loop {
                let relative = axis.cell(along, across);
                let chunk = self.area.take_chunk(relative.x, relative.y);

                if along == trailing {
                    if let Some(dead) = chunk {
                        self.dead_chunks.push(dead);
                    }
                } else {
                    let target = relative - step;
                    self.area.set_chunk(target.x, target.y, chunk);
                }

                if along == leading {
                    // origin has not advanced yet for this step
                    self.undefined_chunks
                        .insert(relative, self.origin + relative + step);
                    break;
                }
                along += direction;
            }
        }

        self.origin += step;
        trace!("Origin stepped by {} to {}", step, self.origin);
    }
}
