//! Driver configuration.
//!
//! Bundles the streamer settings with the scripted walk the headless driver
//! plays back. Configuration can be loaded from and saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use tilestream_world::StreamerConfig;

/// Configuration file name.
pub const CONFIG_FILE: &str = "tilestream.toml";

/// One straight segment of the scripted walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkLeg {
    /// Horizontal direction (-1, 0 or 1)
    pub dx: f32,
    /// Vertical direction (-1, 0 or 1)
    pub dy: f32,
    /// Number of frames to hold this direction
    pub frames: u32,
    /// Hold the sprint modifier
    #[serde(default)]
    pub sprint: bool,
}

/// Scripted movement played back by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Player speed in world pixels per second
    pub base_speed: f32,
    /// Speed multiplier while sprinting
    pub sprint_multiplier: f32,
    /// Simulated frame duration in seconds
    pub frame_time: f32,
    /// Extra frames of random wandering after the legs
    pub random_frames: u32,
    /// Seed for random wandering
    pub random_seed: u64,
    /// Scripted legs, played in order
    pub legs: Vec<WalkLeg>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            base_speed: 200.0,
            sprint_multiplier: 10.0,
            frame_time: 1.0 / 60.0,
            random_frames: 0,
            random_seed: 1,
            legs: vec![
                WalkLeg {
                    dx: 1.0,
                    dy: 0.0,
                    frames: 240,
                    sprint: false,
                },
                WalkLeg {
                    dx: 0.0,
                    dy: 1.0,
                    frames: 60,
                    sprint: true,
                },
                WalkLeg {
                    dx: -1.0,
                    dy: -1.0,
                    frames: 120,
                    sprint: true,
                },
            ],
        }
    }
}

/// Driver configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Starting chunk
    pub origin: (i32, i32),
    /// Write a JSON run report here when set
    pub report_path: Option<PathBuf>,
    /// Print the final window as text
    pub print_map: bool,
    /// Window and generator settings
    pub streamer: StreamerConfig,
    /// Scripted movement
    pub walk: WalkConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            origin: (0, 0),
            report_path: None,
            print_map: true,
            streamer: StreamerConfig::default(),
            walk: WalkConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                },
                Err(e) => {
                    warn!("Failed to parse config file: {e}");
                    Self::default()
                },
            },
            Err(e) => {
                warn!("Failed to read config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    #[allow(dead_code)]
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.streamer.validate();

        self.walk.base_speed = self.walk.base_speed.clamp(0.0, 10_000.0);
        self.walk.sprint_multiplier = self.walk.sprint_multiplier.clamp(1.0, 100.0);
        self.walk.frame_time = self.walk.frame_time.clamp(1.0 / 1000.0, 1.0);
        for leg in &mut self.walk.legs {
            leg.dx = leg.dx.clamp(-1.0, 1.0);
            leg.dy = leg.dy.clamp(-1.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.origin, (0, 0));
        assert_eq!(config.streamer.view_distance, 3);
        assert_eq!(config.walk.legs.len(), 3);
        assert!(config.report_path.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.streamer.view_distance = 99;
        config.walk.sprint_multiplier = 0.0;
        config.walk.legs[0].dx = 5.0;

        config.validate();

        assert_eq!(config.streamer.view_distance, 16);
        assert!((config.walk.sprint_multiplier - 1.0).abs() < f32::EPSILON);
        assert!((config.walk.legs[0].dx - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join(CONFIG_FILE);

        let mut config = EngineConfig::default();
        config.origin = (-4, 9);
        config.streamer.view_distance = 5;
        config.streamer.generator.seed = 1234;
        config.report_path = Some(PathBuf::from("report.json"));

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = EngineConfig::load_from("/nonexistent/path/tilestream.toml");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "[streamer]\nview_distance = 2\n").expect("write");

        let config = EngineConfig::load_from(&config_path);
        assert_eq!(config.streamer.view_distance, 2);
        assert_eq!(config.streamer.texture_size, 256);
        assert_eq!(config.walk, WalkConfig::default());
    }

    #[test]
    fn test_config_invalid_file_falls_back() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "streamer = 12").expect("write");

        let config = EngineConfig::load_from(&config_path);
        assert_eq!(config, EngineConfig::default());
    }
}
