//! Headless driver loop.
//!
//! Plays a scripted walk through a [`WorldStreamer`] with no graphics
//! backend. Textures are plain counters and painting only tallies tile
//! kinds, which is enough to exercise every streaming path end to end.

use std::fmt::Write as _;
use std::fs;
use std::time::Instant;

use glam::Vec2;
use serde::Serialize;
use tracing::{debug, info};

use tilestream_common::{ChunkOrigin, TextureHandle, TilestreamError, TilestreamResult};
use tilestream_world::{
    Chunk, ChunkPainter, RenderTarget, TextureAllocator, TileGenerator, TileKind, TileSource,
    WorldStreamer, CHUNK_TILES,
};

use crate::config::{EngineConfig, WalkConfig};

/// Frames between direction changes while wandering.
const WANDER_INTERVAL: u32 = 30;

/// Texture allocator that hands out sequential handles.
#[derive(Debug, Default)]
pub struct HeadlessAllocator {
    next: u64,
    bytes: u64,
}

impl TextureAllocator for HeadlessAllocator {
    fn allocate(&mut self, width: u32, height: u32) -> TextureHandle {
        self.next += 1;
        // RGBA8
        self.bytes += u64::from(width) * u64::from(height) * 4;
        TextureHandle::new(self.next)
    }
}

/// Count of painted tiles per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TileHistogram {
    /// Water tiles
    pub water: u64,
    /// Dirt tiles
    pub dirt: u64,
    /// Grass tiles
    pub grass: u64,
    /// Indices outside the palette
    pub unknown: u64,
}

/// Painter that records what would have been drawn.
#[derive(Debug, Default)]
pub struct HeadlessPainter {
    painted: u64,
    histogram: TileHistogram,
}

impl ChunkPainter for HeadlessPainter {
    fn paint(&mut self, _target: &RenderTarget, chunk: &Chunk) {
        self.painted += 1;
        for &tile in chunk.tiles() {
            match TileKind::from_index(tile) {
                Some(TileKind::Water) => self.histogram.water += 1,
                Some(TileKind::Dirt) => self.histogram.dirt += 1,
                Some(TileKind::Grass) => self.histogram.grass += 1,
                None => self.histogram.unknown += 1,
            }
        }
    }
}

/// Summary of one driver run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Frames simulated
    pub frames: u64,
    /// Frames that changed the window
    pub streaming_frames: u64,
    /// Chunks generated, including the initial window
    pub generated: u64,
    /// Chunks disposed
    pub disposed: u64,
    /// Chunk the player ended in
    pub final_chunk: ChunkOrigin,
    /// Player position in world pixels
    pub world_position: [f64; 2],
    /// Render textures created up front
    pub textures_allocated: u64,
    /// Bytes those textures would occupy
    pub texture_bytes: u64,
    /// Chunks drawn into render targets
    pub chunks_painted: u64,
    /// Tiles painted, by kind
    pub tiles: TileHistogram,
    /// Wall-clock duration of the run
    pub elapsed_ms: u128,
}

/// Per-frame movement derived from the walk script.
fn frame_deltas(walk: &WalkConfig) -> impl Iterator<Item = Vec2> + '_ {
    let speed = walk.base_speed * walk.frame_time;

    let scripted = walk.legs.iter().flat_map(move |leg| {
        let multiplier = if leg.sprint {
            walk.sprint_multiplier
        } else {
            1.0
        };
        let delta = Vec2::new(leg.dx, leg.dy) * speed * multiplier;
        std::iter::repeat(delta).take(leg.frames as usize)
    });

    let mut rng = fastrand::Rng::with_seed(walk.random_seed);
    let mut direction = Vec2::ZERO;
    let wander = (0..walk.random_frames).map(move |frame| {
        if frame % WANDER_INTERVAL == 0 {
            direction = Vec2::new(
                f32::from(rng.i8(-1..=1)),
                f32::from(rng.i8(-1..=1)),
            );
        }
        direction * speed
    });

    scripted.chain(wander)
}

/// Runs the configured walk and returns its report.
pub fn run(config: &EngineConfig) -> TilestreamResult<RunReport> {
    let started = Instant::now();
    let origin = ChunkOrigin::from(config.origin);

    let mut allocator = HeadlessAllocator::default();
    let mut streamer = WorldStreamer::new(
        config.streamer.clone(),
        origin,
        &mut allocator,
        TileGenerator::new(config.streamer.generator.clone()),
        HeadlessPainter::default(),
    )?;

    let mut frames = 0u64;
    let mut streaming_frames = 0u64;
    let mut generated = streamer.arena().len() as u64;
    let mut disposed = 0u64;
    let mut last_chunk = streamer.current_chunk();

    for delta in frame_deltas(&config.walk) {
        let stats = streamer.advance(delta)?;
        frames += 1;

        if !stats.is_idle() {
            streaming_frames += 1;
            generated += stats.generated as u64;
            disposed += stats.disposed as u64;
        }

        let chunk = streamer.current_chunk();
        if chunk != last_chunk {
            debug!("Frame {frames}: entered chunk {chunk}");
            last_chunk = chunk;
        }
    }

    streamer.check_coverage()?;

    if config.print_map {
        println!("{}", render_map(&streamer));
    }

    let position = streamer.world_position();
    let report = RunReport {
        frames,
        streaming_frames,
        generated,
        disposed,
        final_chunk: streamer.current_chunk(),
        world_position: [position.x, position.y],
        textures_allocated: allocator.next,
        texture_bytes: allocator.bytes,
        chunks_painted: streamer.painter().painted,
        tiles: streamer.painter().histogram,
        elapsed_ms: started.elapsed().as_millis(),
    };

    info!(
        "Walked {} frames to chunk {}: {} generated, {} disposed",
        report.frames, report.final_chunk, report.generated, report.disposed
    );

    if let Some(path) = &config.report_path {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| TilestreamError::Config(format!("report serialization failed: {e}")))?;
        fs::write(path, json)?;
        info!("Wrote run report to {}", path.display());
    }

    Ok(report)
}

/// Renders the window as text, one character per chunk.
///
/// Each chunk shows the kind of its centre tile; the player's chunk is `@`
/// and empty slots are `.`.
pub fn render_map<S: TileSource, P: ChunkPainter>(streamer: &WorldStreamer<S, P>) -> String {
    let size = streamer.manager().view_distance() as i32;
    let centre = CHUNK_TILES / 2;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "chunk {} (view distance {size})",
        streamer.current_chunk()
    );
    for y in -size..=size {
        for x in -size..=size {
            let relative = ChunkOrigin::new(x, y);
            let symbol = if relative == ChunkOrigin::ZERO {
                '@'
            } else {
                streamer
                    .chunk_at(relative)
                    .and_then(|chunk| chunk.tile(centre, centre))
                    .and_then(TileKind::from_index)
                    .map_or('.', TileKind::symbol)
            };
            out.push(symbol);
        }
        out.push('\n');
    }
    out
}
