//! Persisted audio preferences.

use crate::config::AudioConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The user's audio preferences as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSettings {
    /// Whether audio plays at all
    pub enabled: bool,
    /// Master volume (0.0 to 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 to 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 to 1.0)
    pub music_volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self::from_config(&AudioConfig::default())
    }
}

impl AudioSettings {
    /// Settings at the configured default levels, enabled.
    pub fn from_config(config: &AudioConfig) -> Self {
        Self {
            enabled: true,
            master_volume: config.master_volume,
            sfx_volume: config.sfx_volume,
            music_volume: config.music_volume,
        }
    }

    /// Set master volume (clamped to 0.0-1.0).
    pub fn set_master(&mut self, volume: f32) {
        self.master_volume = clamp_volume(volume);
    }

    /// Set SFX volume (clamped to 0.0-1.0).
    pub fn set_sfx(&mut self, volume: f32) {
        self.sfx_volume = clamp_volume(volume);
    }

    /// Set music volume (clamped to 0.0-1.0).
    pub fn set_music(&mut self, volume: f32) {
        self.music_volume = clamp_volume(volume);
    }

    /// Serialize to the stored JSON record.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Read a stored record leniently.
    ///
    /// `enabled` is true unless stored as literal `false`. A volume is taken
    /// only when it is a finite, non-zero number; anything else (missing,
    /// zero, null, strings) falls back to `defaults`. Values are clamped.
    pub fn from_stored(value: &Value, defaults: &AudioSettings) -> Self {
        let enabled = !matches!(value.get("enabled"), Some(Value::Bool(false)));
        let volume = |field: &str, fallback: f32| {
            value
                .get(field)
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite() && *v != 0.0)
                .map(|v| clamp_volume(v as f32))
                .unwrap_or(fallback)
        };
        Self {
            enabled,
            master_volume: volume("masterVolume", defaults.master_volume),
            sfx_volume: volume("sfxVolume", defaults.sfx_volume),
            music_volume: volume("musicVolume", defaults.music_volume),
        }
    }
}

/// Clamp a volume into [0, 1]. NaN becomes silence.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_settings() {
        let settings = AudioSettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.master_volume, 0.7);
        assert_eq!(settings.sfx_volume, 0.8);
        assert_eq!(settings.music_volume, 0.5);
    }

    #[test]
    fn test_volume_clamping() {
        let mut settings = AudioSettings::default();
        settings.set_master(1.5);
        assert_eq!(settings.master_volume, 1.0);

        settings.set_music(-0.5);
        assert_eq!(settings.music_volume, 0.0);

        settings.set_sfx(0.25);
        assert_eq!(settings.sfx_volume, 0.25);

        settings.set_sfx(f32::NAN);
        assert_eq!(settings.sfx_volume, 0.0);
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let json = AudioSettings::default().to_json().unwrap();
        assert!(json.contains("\"masterVolume\""));
        assert!(json.contains("\"sfxVolume\""));
        assert!(json.contains("\"musicVolume\""));
        assert!(json.contains("\"enabled\":true"));
    }

    #[test]
    fn test_stored_record_applied() {
        let defaults = AudioSettings::default();
        let stored = json!({
            "enabled": false,
            "masterVolume": 0.3,
            "sfxVolume": 0.6,
            "musicVolume": 0.9
        });
        let settings = AudioSettings::from_stored(&stored, &defaults);
        assert!(!settings.enabled);
        assert!((settings.master_volume - 0.3).abs() < 1e-6);
        assert!((settings.sfx_volume - 0.6).abs() < 1e-6);
        assert!((settings.music_volume - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_stored_record_falls_back() {
        let defaults = AudioSettings::default();
        let stored = json!({
            "enabled": "no",
            "masterVolume": 0,
            "sfxVolume": "loud",
            "musicVolume": 7
        });
        let settings = AudioSettings::from_stored(&stored, &defaults);
        assert!(settings.enabled);
        assert_eq!(settings.master_volume, defaults.master_volume);
        assert_eq!(settings.sfx_volume, defaults.sfx_volume);
        assert_eq!(settings.music_volume, 1.0);
    }

    #[test]
    fn test_non_object_record_is_all_defaults() {
        let defaults = AudioSettings::default();
        assert_eq!(AudioSettings::from_stored(&json!(5), &defaults), defaults);
        assert_eq!(AudioSettings::from_stored(&json!(null), &defaults), defaults);
    }
}
