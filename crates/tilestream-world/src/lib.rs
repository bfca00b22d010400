//! # Tilestream World
//!
//! Chunk window streaming for Tilestream.
//!
//! This crate handles:
//! - Square rings of chunk slots around a moving origin
//! - Scrolling the window and reporting evicted and exposed slots
//! - Chunk storage and render target pooling
//! - Procedural tile generation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod arena;
pub mod chunk;
pub mod generation;
pub mod manager;
pub mod pool;
pub mod render_area;
pub mod streaming;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::arena::*;
    pub use crate::chunk::*;
    pub use crate::generation::*;
    pub use crate::manager::*;
    pub use crate::pool::*;
    pub use crate::render_area::*;
    pub use crate::streaming::*;
}

pub use prelude::*;
