//! # Tilestream
//!
//! Headless driver for the chunk streaming window.
//!
//! Loads `tilestream.toml` (or the path given as the first argument), walks
//! the configured route and logs what the window streamed on the way.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{EngineConfig, CONFIG_FILE};

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("tilestream=info".parse()?))
        .init();

    info!("Tilestream starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_FILE.to_string());
    let mut config = EngineConfig::load_from(&path);
    config.validate();

    let report = app::run(&config)?;
    info!(
        "Run complete in {} ms ({} streaming frames)",
        report.elapsed_ms, report.streaming_frames
    );

    Ok(())
}
