use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::{
    audio::AudioConfig,
    grid::{GridGeometry, PaletteSlot},
    timing::TransportConfig,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridGeometry,
    pub transport: TransportConfig,
    /// Palette layout. Empty means one slot per pitch along the bottom edge.
    pub palette: Vec<PaletteSlot>,
    pub audio: AudioConfig,
}

impl Config {
    pub fn palette_slots(&self) -> Vec<PaletteSlot> {
        if self.palette.is_empty() {
            PaletteSlot::chromatic(&self.grid)
        } else {
            self.palette.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        if grid.rows == 0 {
            return Err(ConfigError::Invalid("grid needs at least one row".into()));
        }
        if grid.width <= 0.0 || grid.height <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "grid size {}x{} must be positive",
                grid.width, grid.height
            )));
        }
        if grid.trigger_window < 0.0 || grid.row_tolerance < 0.0 {
            return Err(ConfigError::Invalid("tolerances must not be negative".into()));
        }

        let transport = &self.transport;
        if transport.tick_period <= 0.0 || transport.speed <= 0.0 {
            return Err(ConfigError::Invalid(
                "tick period and speed must be positive".into(),
            ));
        }
        if transport.track_width <= 0.0 {
            return Err(ConfigError::Invalid("track width must be positive".into()));
        }

        Ok(())
    }

    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        let config: Config = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ron_string = fs::read_to_string(path)?;
        Self::from_ron(&ron_string)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, ron_string)?;
        Ok(())
    }
}
