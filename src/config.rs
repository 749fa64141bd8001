use chiptone_audio::AudioConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "config/chiptone.toml";
const DEFAULT_SETTINGS_DIR: &str = "config/settings";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Directory holding the persisted audio settings record.
    pub settings_dir: PathBuf,
    /// Host frame length in milliseconds.
    pub frame_ms: u64,
    pub audio: AudioConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            settings_dir: PathBuf::from(DEFAULT_SETTINGS_DIR),
            frame_ms: 16,
            audio: AudioConfig::default(),
        }
    }
}

impl PlayerConfig {
    /// Load player configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    PlayerConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                PlayerConfig::default()
            }
        }
    }

    fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let mut cfg: PlayerConfig = toml::from_str(contents)?;
        cfg.audio = cfg.audio.sanitized();
        cfg.frame_ms = cfg.frame_ms.clamp(1, 100);
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let cfg = PlayerConfig::load_from_path(Path::new("/nonexistent/chiptone.toml"));
        assert_eq!(cfg.frame_ms, 16);
        assert_eq!(cfg.settings_dir, PathBuf::from(DEFAULT_SETTINGS_DIR));
        assert_eq!(cfg.audio, AudioConfig::default());
    }

    #[test]
    fn parses_bundled_config() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let cfg = PlayerConfig::load_from_path(&path);
        assert_eq!(cfg.audio.storage_key, "audioSettings");
        assert_eq!(cfg.audio.tones.len(), 1);
        assert_eq!(cfg.audio.tones[0].name, "laser");
    }

    #[test]
    fn audio_section_is_sanitized() {
        let cfg = PlayerConfig::from_toml_str("frame_ms = 0\n[audio]\nmaster_volume = 4.0\n")
            .expect("valid toml");
        assert_eq!(cfg.frame_ms, 1);
        assert_eq!(cfg.audio.master_volume, 1.0);
    }
}
