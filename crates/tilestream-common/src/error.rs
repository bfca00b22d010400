//! Error types for Tilestream.

use thiserror::Error;

use crate::coords::ChunkOrigin;
use crate::ids::{ChunkKey, RenderTargetId};

/// Top-level error type for Tilestream operations.
#[derive(Debug, Error)]
pub enum TilestreamError {
    /// World/chunk errors
    #[error("World error: {0}")]
    World(#[from] WorldError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Chunk storage and streaming errors.
#[derive(Debug, Error)]
pub enum WorldError {
    /// Key does not name a live chunk
    #[error("Stale or unknown chunk key {0}")]
    StaleChunkKey(ChunkKey),

    /// Every render target is in use
    #[error("Render target pool exhausted ({capacity} targets)")]
    PoolExhausted {
        /// Pool capacity
        capacity: usize,
    },

    /// Release of a target that is not checked out
    #[error("Render target {0:?} is not in use")]
    TargetNotInUse(RenderTargetId),

    /// A window slot disagrees with the origin it should represent
    #[error("Coverage violation at relative {relative}: {reason}")]
    CoverageViolation {
        /// Relative slot
        relative: ChunkOrigin,
        /// What went wrong
        reason: String,
    },
}

/// Result type alias for world operations.
pub type WorldResult<T> = Result<T, WorldError>;

/// Result type alias for Tilestream operations.
pub type TilestreamResult<T> = Result<T, TilestreamError>;
