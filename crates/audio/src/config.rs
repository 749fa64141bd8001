//! Service configuration.

use crate::settings::clamp_volume;
use crate::synth::Waveform;
use crate::tones::ToneDescriptor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Storage key the settings record lives under.
pub const DEFAULT_STORAGE_KEY: &str = "audioSettings";

/// Static configuration of an [`AudioService`](crate::AudioService).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Default master volume (0.0 to 1.0).
    pub master_volume: f32,
    /// Default sound effects volume (0.0 to 1.0).
    pub sfx_volume: f32,
    /// Default music volume (0.0 to 1.0).
    pub music_volume: f32,
    /// Key of the persisted settings record.
    pub storage_key: String,
    /// Gain the note envelope decays toward. Must stay above zero.
    pub decay_floor: f32,
    /// Oscillator used for melody notes.
    pub melody_waveform: Waveform,
    /// Gain of melody notes.
    pub melody_volume: f32,
    /// Step length used when a caller has no tempo of its own.
    pub default_tempo_ms: u32,
    /// Output sample rate for synthesized voices.
    pub sample_rate: u32,
    /// Extra tones registered next to the built-in ones.
    pub tones: Vec<ToneDescriptor>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: 0.7,
            sfx_volume: 0.8,
            music_volume: 0.5,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            decay_floor: 0.001,
            melody_waveform: Waveform::Triangle,
            melody_volume: 0.3,
            default_tempo_ms: 200,
            sample_rate: 44_100,
            tones: Vec::new(),
        }
    }
}

impl AudioConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<AudioConfig>(contents).map(AudioConfig::sanitized)
    }

    /// Load configuration from `path`, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    AudioConfig::default()
                }
            },
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
                AudioConfig::default()
            }
        }
    }

    /// Clamp values that would break playback.
    pub fn sanitized(mut self) -> Self {
        let defaults = AudioConfig::default();
        self.master_volume = clamp_volume(self.master_volume);
        self.sfx_volume = clamp_volume(self.sfx_volume);
        self.music_volume = clamp_volume(self.music_volume);
        self.melody_volume = clamp_volume(self.melody_volume);
        if self.decay_floor.is_nan() || self.decay_floor <= 0.0 {
            warn!(
                decay_floor = self.decay_floor,
                "decay_floor must be positive, using {}", defaults.decay_floor
            );
            self.decay_floor = defaults.decay_floor;
        }
        if self.sample_rate == 0 {
            self.sample_rate = defaults.sample_rate;
        }
        if self.default_tempo_ms == 0 {
            self.default_tempo_ms = defaults.default_tempo_ms;
        }
        if self.storage_key.trim().is_empty() {
            self.storage_key = defaults.storage_key;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_levels() {
        let config = AudioConfig::default();
        assert_eq!(config.master_volume, 0.7);
        assert_eq!(config.sfx_volume, 0.8);
        assert_eq!(config.music_volume, 0.5);
        assert_eq!(config.storage_key, "audioSettings");
        assert_eq!(config.melody_waveform, Waveform::Triangle);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = AudioConfig::from_toml_str("master_volume = 0.4\n").unwrap();
        assert_eq!(config.master_volume, 0.4);
        assert_eq!(config.sfx_volume, 0.8);
    }

    #[test]
    fn toml_tones_and_clamping() {
        let config = AudioConfig::from_toml_str(
            r#"
sfx_volume = 3.0
decay_floor = 0.0

[[tones]]
name = "laser"
frequency = 1500.0
duration = 0.1
waveform = "square"
"#,
        )
        .unwrap();
        assert_eq!(config.sfx_volume, 1.0);
        assert_eq!(config.decay_floor, 0.001);
        assert_eq!(config.tones.len(), 1);
        assert_eq!(config.tones[0].waveform, Waveform::Square);
    }

    #[test]
    fn nan_volumes_are_silenced() {
        let config = AudioConfig::from_toml_str(
            "master_volume = nan\nsfx_volume = nan\nmusic_volume = -inf\nmelody_volume = nan\n",
        )
        .unwrap();
        assert_eq!(config.master_volume, 0.0);
        assert_eq!(config.sfx_volume, 0.0);
        assert_eq!(config.music_volume, 0.0);
        assert_eq!(config.melody_volume, 0.0);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = AudioConfig::load_from_path(Path::new("/nonexistent/chiptone.toml"));
        assert_eq!(config, AudioConfig::default());
    }
}
