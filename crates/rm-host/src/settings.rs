//! User settings, loaded from YAML.
//!
//! Every field has a default, so an empty file (or no file) is valid.
//!
//! ```yaml
//! frequency: 220
//! amplitude: 0.5
//! waveform: triangle
//! interpolation: linear
//! block_size: 256
//! ```

use rm_dsp::{Interpolation, Waveform, DEFAULT_TABLE_SIZE};
use rm_engine::EngineConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::error::SettingsError;

/// Lowest carrier frequency the control surface offers.
pub const FREQUENCY_MIN: f32 = 20.0;
/// Highest carrier frequency the control surface offers.
pub const FREQUENCY_MAX: f32 = 4000.0;

/// Clamp a user-entered frequency to the control surface's dial range.
pub fn clamp_frequency(hz: f32) -> f32 {
    if hz.is_nan() {
        FREQUENCY_MIN
    } else {
        hz.clamp(FREQUENCY_MIN, FREQUENCY_MAX)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Carrier frequency in Hz.
    pub frequency: f32,
    /// Carrier scale before multiplication.
    pub amplitude: f32,
    /// Start with the effect engaged.
    pub enabled: bool,
    pub waveform: Waveform,
    pub interpolation: Interpolation,
    pub table_size: usize,
    /// Activity indicator time constant.
    pub activity_time_ms: f32,
    /// Frames per block for offline rendering.
    pub block_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            frequency: engine.default_frequency,
            amplitude: engine.amplitude,
            enabled: engine.enabled,
            waveform: engine.waveform,
            interpolation: engine.interpolation,
            table_size: DEFAULT_TABLE_SIZE,
            activity_time_ms: engine.activity_time_ms,
            block_size: rm_dsp::BLOCK_SIZE,
        }
    }
}

impl Settings {
    pub fn from_yaml(text: &str) -> Result<Self, SettingsError> {
        // An empty document deserializes as unit, not as an empty map.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Engine defaults for a new session. The frequency is held to the
    /// control surface range.
    pub fn engine_config(&self) -> EngineConfig {
        let frequency = clamp_frequency(self.frequency);
        if frequency != self.frequency {
            warn!(requested = self.frequency, frequency, "frequency clamped to control range");
        }
        EngineConfig {
            table_size: self.table_size,
            waveform: self.waveform,
            interpolation: self.interpolation,
            default_frequency: frequency,
            amplitude: self.amplitude,
            enabled: self.enabled,
            activity_time_ms: self.activity_time_ms,
        }
    }
}
