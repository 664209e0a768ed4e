//! Configuration file support for PlankFlow.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/plankflow/config.toml`.

use crate::difficulty::{DEFAULT_LEVEL, LEVEL_COUNT};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub workout: WorkoutSettings,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Workout timing configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutSettings {
    /// Difficulty level, 0 (Beginner) to 4 (Expert)
    #[serde(default = "default_level")]
    pub level: u8,

    /// Multiplier applied to every phase duration
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,

    /// Period of the tick source
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for WorkoutSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            time_scale: default_time_scale(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|_| PathBuf::from("."))
    });
    base.join("plankflow")
}

fn default_level() -> u8 {
    DEFAULT_LEVEL
}

fn default_time_scale() -> f64 {
    1.0
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        base.join("plankflow").join("config.toml")
    }

    /// Check that workout settings are usable
    pub fn validate(&self) -> Result<()> {
        let workout = &self.workout;
        if usize::from(workout.level) >= LEVEL_COUNT {
            return Err(Error::Config(format!(
                "level must be between 0 and {}, got {}",
                LEVEL_COUNT - 1,
                workout.level
            )));
        }
        if !workout.time_scale.is_finite() || workout.time_scale <= 0.0 {
            return Err(Error::Config(format!(
                "time_scale must be a positive number, got {}",
                workout.time_scale
            )));
        }
        if workout.tick_interval_ms == 0 {
            return Err(Error::Config("tick_interval_ms must be positive".into()));
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
