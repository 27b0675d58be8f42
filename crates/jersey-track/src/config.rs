//! JSON configuration for the whole pipeline.

use std::{fs, path::Path};

use jersey_track_detect::{SmartCropParams, TilingParams};
use jersey_track_tracker::TrackerParams;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Every tunable of the pipeline. Missing JSON fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tiling: TilingParams,
    pub crop: SmartCropParams,
    pub tracker: TrackerParams,
    /// Analyze one frame out of every `throttle_every` arrivals (0 and 1
    /// analyze all of them).
    pub throttle_every: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tiling: TilingParams::default(),
            crop: SmartCropParams::default(),
            tracker: TrackerParams::default(),
            throttle_every: 2,
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
