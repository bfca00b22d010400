//! Game-loop side of the window: generation, disposal and player tracking.
//!
//! [`WorldStreamer`] owns everything the [`RenderAreaManager`] only points at:
//! the chunk arena, the render target pool and the tile source. After every
//! origin move it drains the manager's dead and undefined queues so the
//! window is fully populated again before the next frame draws it.

use glam::{DVec2, Vec2};
use serde::{Deserialize, Serialize};
use tilestream_common::{ChunkKey, ChunkOrigin, WorldError, WorldResult};
use tracing::{debug, info};

use crate::arena::ChunkArena;
use crate::chunk::{Chunk, ChunkState};
use crate::generation::{GeneratorConfig, TileSource};
use crate::manager::RenderAreaManager;
use crate::pool::{RenderTarget, RenderTargetPool, TextureAllocator, DEFAULT_TEXTURE_SIZE};

/// Default view distance in chunks.
pub const DEFAULT_VIEW_DISTANCE: u32 = 3;

/// Default chunk edge length in world pixels.
pub const DEFAULT_CHUNK_PIXELS: f32 = 256.0;

/// Backend hook that draws a generated chunk into its render target.
pub trait ChunkPainter {
    /// Draws `chunk`'s tiles into `target`.
    fn paint(&mut self, target: &RenderTarget, chunk: &Chunk);
}

/// Streamer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamerConfig {
    /// Radius of the window in chunks
    pub view_distance: u32,
    /// Chunk edge length in world pixels
    pub chunk_pixels: f32,
    /// Render target edge length in pixels
    pub texture_size: u32,
    /// Tile generator settings
    pub generator: GeneratorConfig,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            view_distance: DEFAULT_VIEW_DISTANCE,
            chunk_pixels: DEFAULT_CHUNK_PIXELS,
            texture_size: DEFAULT_TEXTURE_SIZE,
            generator: GeneratorConfig::default(),
        }
    }
}

impl StreamerConfig {
    /// Clamps values to sensible ranges.
    pub fn validate(&mut self) {
        self.view_distance = self.view_distance.clamp(1, 16);
        self.chunk_pixels = self.chunk_pixels.clamp(16.0, 4096.0);
        self.texture_size = self.texture_size.clamp(16, 4096);
        self.generator.octaves = self.generator.octaves.clamp(1, 12);
    }
}

/// What one [`WorldStreamer::refresh`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshStats {
    /// Chunks generated and installed
    pub generated: usize,
    /// Chunks disposed after leaving the window
    pub disposed: usize,
}

impl RefreshStats {
    /// Checks whether anything changed.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.generated == 0 && self.disposed == 0
    }
}

/// Keeps a fully generated window of chunks around a moving player.
pub struct WorldStreamer<S, P> {
    /// Configuration
    config: StreamerConfig,
    /// Window bookkeeping
    manager: RenderAreaManager,
    /// Chunk storage
    arena: ChunkArena,
    /// Render targets for live chunks
    pool: RenderTargetPool,
    /// Tile generation callback
    source: S,
    /// Drawing backend
    painter: P,
    /// Player position relative to the centre chunk, in world pixels
    local_position: Vec2,
}

impl<S: TileSource, P: ChunkPainter> WorldStreamer<S, P> {
    /// Builds the streamer and generates the initial window around `origin`.
    pub fn new(
        config: StreamerConfig,
        origin: ChunkOrigin,
        allocator: &mut dyn TextureAllocator,
        source: S,
        painter: P,
    ) -> WorldResult<Self> {
        let manager = RenderAreaManager::new(config.view_distance, origin);
        let cells = manager.area().cell_count();
        let pool = RenderTargetPool::new(cells, config.texture_size, allocator);

        info!(
            "Creating world streamer: view_distance={}, {} chunks, origin={}",
            config.view_distance, cells, origin
        );

        let mut streamer = Self {
            config,
            manager,
            arena: ChunkArena::with_capacity(cells),
            pool,
            source,
            painter,
            local_position: Vec2::ZERO,
        };
        streamer.refresh()?;
        Ok(streamer)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &StreamerConfig {
        &self.config
    }

    /// Returns the window manager.
    #[must_use]
    pub const fn manager(&self) -> &RenderAreaManager {
        &self.manager
    }

    /// Returns the chunk arena.
    #[must_use]
    pub const fn arena(&self) -> &ChunkArena {
        &self.arena
    }

    /// Returns the render target pool.
    #[must_use]
    pub const fn pool(&self) -> &RenderTargetPool {
        &self.pool
    }

    /// Returns the drawing backend.
    #[must_use]
    pub const fn painter(&self) -> &P {
        &self.painter
    }

    /// Global coordinate of the chunk the player stands in.
    #[must_use]
    pub const fn current_chunk(&self) -> ChunkOrigin {
        self.manager.origin()
    }

    /// Player offset from the centre of the current chunk, in world pixels.
    #[must_use]
    pub const fn local_position(&self) -> Vec2 {
        self.local_position
    }

    /// Absolute player position in world pixels.
    #[must_use]
    pub fn world_position(&self) -> DVec2 {
        let chunk = self.current_chunk();
        let size = f64::from(self.config.chunk_pixels);
        DVec2::new(
            f64::from(chunk.x) * size + f64::from(self.local_position.x),
            f64::from(chunk.y) * size + f64::from(self.local_position.y),
        )
    }

    /// Returns the chunk in a relative window slot.
    #[must_use]
    pub fn chunk_at(&self, relative: ChunkOrigin) -> Option<&Chunk> {
        self.manager
            .area()
            .get_chunk(relative.x, relative.y)
            .and_then(|key| self.arena.get(key))
    }

    /// Moves the player by `delta` world pixels and streams as needed.
    ///
    /// Crossing half a chunk on an axis recentres the window by one chunk on
    /// that axis. At most one recentre per axis happens per call.
    pub fn advance(&mut self, delta: Vec2) -> WorldResult<RefreshStats> {
        self.local_position += delta;

        let size = self.config.chunk_pixels;
        let half = size * 0.5;

        if self.local_position.x > half {
            self.manager.move_origin(1, 0);
            self.local_position.x -= size;
        } else if self.local_position.x < -half {
            self.manager.move_origin(-1, 0);
            self.local_position.x += size;
        }

        if self.local_position.y > half {
            self.manager.move_origin(0, 1);
            self.local_position.y -= size;
        } else if self.local_position.y < -half {
            self.manager.move_origin(0, -1);
            self.local_position.y += size;
        }

        self.refresh()
    }

    /// Moves the window origin directly by whole chunks and refreshes.
    pub fn move_origin(&mut self, dx: i32, dy: i32) -> WorldResult<RefreshStats> {
        self.manager.move_origin(dx, dy);
        self.refresh()
    }

    /// Disposes dead chunks and generates every undefined slot.
    pub fn refresh(&mut self) -> WorldResult<RefreshStats> {
        let mut stats = RefreshStats::default();

        let dead = self.manager.drain_dead_chunks();
        for (i, &key) in dead.iter().enumerate() {
            if let Err(e) = self.dispose(key) {
                // keys after the failing one are still live
                self.manager.requeue_dead_chunks(&dead[i + 1..]);
                return Err(e);
            }
            stats.disposed += 1;
        }

        let mut pending: Vec<_> = self
            .manager
            .undefined_chunks()
            .iter()
            .map(|(relative, global)| (*relative, *global))
            .collect();
        pending.sort_unstable_by_key(|(relative, _)| *relative);

        for (relative, global) in pending {
            let target = self.pool.acquire()?;

            let mut chunk = Chunk::new(global);
            self.source.fill(global, chunk.tiles_mut());
            chunk.set_state(ChunkState::Generated);

            chunk.set_render_target(Some(target));
            if let Some(render_target) = self.pool.get(target) {
                self.painter.paint(render_target, &chunk);
                chunk.set_state(ChunkState::Cached);
            }

            let key = self.arena.insert(chunk);
            self.manager.install(relative, key);
            stats.generated += 1;
        }

        if !stats.is_idle() {
            debug!(
                "Refreshed window at {}: generated={}, disposed={}",
                self.manager.origin(),
                stats.generated,
                stats.disposed
            );
        }
        Ok(stats)
    }

    fn dispose(&mut self, key: ChunkKey) -> WorldResult<()> {
        let mut chunk = self.arena.remove(key)?;
        if let Some(target) = chunk.take_render_target() {
            self.pool.release(target)?;
        }
        Ok(())
    }

    /// Verifies that every slot holds the chunk for `origin + relative` or is
    /// still pending generation.
    pub fn check_coverage(&self) -> WorldResult<()> {
        let origin = self.manager.origin();
        let undefined = self.manager.undefined_chunks();

        for (relative, slot) in self.manager.area().iter() {
            let expected = origin + relative;
            let violation = |reason: String| WorldError::CoverageViolation { relative, reason };

            match slot {
                Some(key) => {
                    let chunk = self
                        .arena
                        .get(key)
                        .ok_or_else(|| violation(format!("dangling key {key}")))?;
                    if chunk.origin() != expected {
                        return Err(violation(format!(
                            "holds {} instead of {expected}",
                            chunk.origin()
                        )));
                    }
                    if undefined.contains_key(&relative) {
                        return Err(violation("populated and undefined".into()));
                    }
                },
                None => match undefined.get(&relative) {
                    Some(global) if *global == expected => {},
                    Some(global) => {
                        return Err(violation(format!(
                            "pending {global} instead of {expected}"
                        )));
                    },
                    None => return Err(violation("empty and not pending".into())),
                },
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::CHUNK_TILE_COUNT;
    use crate::generation::TileGenerator;
    use tilestream_common::TextureHandle;

    #[derive(Default)]
    struct NullAllocator {
        next: u64,
    }

    impl TextureAllocator for NullAllocator {
        fn allocate(&mut self, _width: u32, _height: u32) -> TextureHandle {
            self.next += 1;
            TextureHandle::new(self.next)
        }
    }

    #[derive(Default)]
    struct RecordingPainter {
        painted: Vec<ChunkOrigin>,
    }

    impl ChunkPainter for RecordingPainter {
        fn paint(&mut self, _target: &RenderTarget, chunk: &Chunk) {
            self.painted.push(chunk.origin());
        }
    }

    /// Writes each chunk's x coordinate into every tile.
    struct StripeSource;

    impl TileSource for StripeSource {
        fn fill(&self, origin: ChunkOrigin, tiles: &mut [i32; CHUNK_TILE_COUNT]) {
            tiles.fill(origin.x);
        }
    }

    fn streamer(view_distance: u32) -> WorldStreamer<StripeSource, RecordingPainter> {
        let config = StreamerConfig {
            view_distance,
            chunk_pixels: 100.0,
            ..Default::default()
        };
        WorldStreamer::new(
            config,
            ChunkOrigin::ZERO,
            &mut NullAllocator::default(),
            StripeSource,
            RecordingPainter::default(),
        )
        .expect("streamer should build")
    }

    #[test]
    fn test_initial_window_is_filled() {
        let streamer = streamer(2);
        assert_eq!(streamer.arena().len(), 25);
        assert_eq!(streamer.pool().available(), 0);
        assert_eq!(streamer.painter().painted.len(), 25);
        assert!(streamer.manager().undefined_chunks().is_empty());
        streamer.check_coverage().expect("coverage");

        let corner = streamer.chunk_at(ChunkOrigin::new(-2, 2)).expect("corner");
        assert_eq!(corner.origin(), ChunkOrigin::new(-2, 2));
        assert_eq!(corner.state(), ChunkState::Cached);
        assert!(corner.tiles().iter().all(|&t| t == -2));
    }

    #[test]
    fn test_advance_below_threshold_does_nothing() {
        let mut streamer = streamer(1);
        let stats = streamer
            .advance(Vec2::new(49.0, -49.0))
            .expect("advance");
        assert!(stats.is_idle());
        assert_eq!(streamer.current_chunk(), ChunkOrigin::ZERO);
    }

    #[test]
    fn test_advance_crosses_half_chunk() {
        let mut streamer = streamer(1);
        let stats = streamer.advance(Vec2::new(60.0, 0.0)).expect("advance");

        assert_eq!(stats, RefreshStats { generated: 3, disposed: 3 });
        assert_eq!(streamer.current_chunk(), ChunkOrigin::new(1, 0));
        assert!((streamer.local_position().x + 40.0).abs() < 1e-4);
        assert!((streamer.world_position().x - 60.0).abs() < 1e-4);
        assert_eq!(streamer.pool().available(), 0);
        streamer.check_coverage().expect("coverage");
    }

    #[test]
    fn test_advance_diagonal_up_left() {
        let mut streamer = streamer(2);
        let stats = streamer
            .advance(Vec2::new(-70.0, -70.0))
            .expect("advance");

        // one column then one row, sharing a corner
        assert_eq!(stats.disposed, 9);
        assert_eq!(stats.generated, 9);
        assert_eq!(streamer.current_chunk(), ChunkOrigin::new(-1, -1));
        streamer.check_coverage().expect("coverage");
    }

    #[test]
    fn test_long_walk_never_exhausts_pool() {
        let mut streamer = streamer(3);
        let mut rng = fastrand::Rng::with_seed(7);

        for _ in 0..200 {
            let delta = Vec2::new(rng.f32() * 160.0 - 80.0, rng.f32() * 160.0 - 80.0);
            streamer.advance(delta).expect("advance");
            assert_eq!(streamer.arena().len(), 49);
            assert_eq!(streamer.pool().available(), 0);
        }
        streamer.check_coverage().expect("coverage");
    }

    #[test]
    fn test_direct_jump() {
        let mut streamer = streamer(1);
        let stats = streamer.move_origin(10, -10).expect("jump");
        assert_eq!(stats.disposed, 9);
        assert_eq!(stats.generated, 9);
        assert_eq!(streamer.current_chunk(), ChunkOrigin::new(10, -10));
        streamer.check_coverage().expect("coverage");
    }

    #[test]
    fn test_check_coverage_flags_wrong_chunk() {
        let mut streamer = streamer(1);
        let a = streamer.manager.area().get_chunk(1, 0).expect("filled");
        let b = streamer.manager.area().get_chunk(-1, 0).expect("filled");
        streamer.manager.area_mut().set_chunk(1, 0, Some(b));
        streamer.manager.area_mut().set_chunk(-1, 0, Some(a));

        assert!(matches!(
            streamer.check_coverage(),
            Err(WorldError::CoverageViolation { .. })
        ));
    }

    #[test]
    fn test_failed_disposal_keeps_remaining_dead_keys() {
        let mut streamer = streamer(1);
        streamer.manager.move_origin(1, 0);
        let dead = streamer.manager.dead_chunks().to_vec();
        assert_eq!(dead.len(), 3);

        // dispose the middle key behind the streamer's back
        let mut stolen = streamer.arena.remove(dead[1]).expect("live chunk");
        let target = stolen.take_render_target().expect("painted chunk");
        streamer.pool.release(target).expect("release");

        assert!(matches!(
            streamer.refresh(),
            Err(WorldError::StaleChunkKey(key)) if key == dead[1]
        ));
        assert_eq!(streamer.manager().dead_chunks(), &dead[2..]);
        assert!(streamer.arena().contains(dead[2]));

        let stats = streamer.refresh().expect("refresh");
        assert_eq!(stats, RefreshStats { generated: 3, disposed: 1 });
        assert!(streamer.manager().dead_chunks().is_empty());
        assert_eq!(streamer.arena().len(), 9);
        assert_eq!(streamer.pool().available(), 0);
        streamer.check_coverage().expect("coverage");
    }

    #[test]
    fn test_with_noise_generator() {
        let config = StreamerConfig {
            view_distance: 1,
            ..Default::default()
        };
        let streamer = WorldStreamer::new(
            config,
            ChunkOrigin::new(100, 100),
            &mut NullAllocator::default(),
            TileGenerator::with_seed(3),
            RecordingPainter::default(),
        )
        .expect("streamer should build");
        streamer.check_coverage().expect("coverage");
    }

    #[test]
    fn test_config_validate_clamps() {
        let mut config = StreamerConfig {
            view_distance: 0,
            chunk_pixels: 1.0,
            texture_size: 100_000,
            ..Default::default()
        };
        config.validate();
        assert_eq!(config.view_distance, 1);
        assert!((config.chunk_pixels - 16.0).abs() < f32::EPSILON);
        assert_eq!(config.texture_size, 4096);
    }
}
