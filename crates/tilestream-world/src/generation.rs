//! Procedural tile generation.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use tilestream_common::ChunkOrigin;

use crate::chunk::{TileIndex, CHUNK_TILES, CHUNK_TILE_COUNT};

/// Fills a chunk's tiles for a global chunk coordinate.
pub trait TileSource {
    /// Writes all tiles (row-major) for the chunk at `origin`.
    fn fill(&self, origin: ChunkOrigin, tiles: &mut [TileIndex; CHUNK_TILE_COUNT]);
}

/// Terrain classes produced by [`TileGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Low ground
    Water,
    /// Middle band
    Dirt,
    /// High ground
    Grass,
}

impl TileKind {
    /// Maps a tile index to its kind, `None` for unknown indices.
    #[must_use]
    pub const fn from_index(index: TileIndex) -> Option<Self> {
        match index {
            0 => Some(Self::Water),
            1 => Some(Self::Dirt),
            2 => Some(Self::Grass),
            _ => None,
        }
    }

    /// Returns the tile index for this kind.
    #[must_use]
    pub const fn index(self) -> TileIndex {
        match self {
            Self::Water => 0,
            Self::Dirt => 1,
            Self::Grass => 2,
        }
    }

    /// Single-character symbol for text dumps.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Water => '~',
            Self::Dirt => '#',
            Self::Grass => '"',
        }
    }
}

/// Tile generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// World seed
    pub seed: u32,
    /// Fractal octaves
    pub octaves: usize,
    /// Frequency multiplier between octaves
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves
    pub persistence: f64,
    /// Third noise coordinate (selects a slice of 3D noise)
    pub depth: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            depth: 1.0,
        }
    }
}

/// Fractal-noise terrain generator.
pub struct TileGenerator {
    /// Configuration
    config: GeneratorConfig,
    /// Terrain noise
    noise: Fbm<Perlin>,
}

impl TileGenerator {
    /// Creates a new generator with the given config.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let noise = Fbm::<Perlin>::new(config.seed)
            .set_octaves(config.octaves)
            .set_lacunarity(config.lacunarity)
            .set_persistence(config.persistence);

        Self { config, noise }
    }

    /// Creates a generator with default config.
    #[must_use]
    pub fn with_seed(seed: u32) -> Self {
        Self::new(GeneratorConfig {
            seed,
            ..Default::default()
        })
    }

    /// Returns the generator configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Samples the tile at a position given in chunk units.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> TileIndex {
        let n = self.noise.get([x, y, self.config.depth]);
        let value = (n + 1.0) * 0.49;
        Self::classify(value).index()
    }

    /// Maps a normalized height (nominally 0..1) to a terrain class.
    #[must_use]
    fn classify(value: f64) -> TileKind {
        match (value * 3.0).floor() {
            v if v < 1.0 => TileKind::Water,
            v if v < 2.0 => TileKind::Dirt,
            _ => TileKind::Grass,
        }
    }
}

impl TileSource for TileGenerator {
    fn fill(&self, origin: ChunkOrigin, tiles: &mut [TileIndex; CHUNK_TILE_COUNT]) {
        let step = 1.0 / CHUNK_TILES as f64;
        for y in 0..CHUNK_TILES {
            for x in 0..CHUNK_TILES {
                let nx = origin.x as f64 + step * x as f64;
                let ny = origin.y as f64 + step * y as f64;
                tiles[y * CHUNK_TILES + x] = self.sample(nx, ny);
            }
        }
    }
}
