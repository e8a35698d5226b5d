//! User configuration management
//!
//! All tunables live in one TOML file in the platform config directory:
//! window geometry, asset paths, device overrides and the reactive
//! constants. Missing fields take their defaults, so old config files
//! keep working as new fields appear.

use serde::{Deserialize, Serialize};
use sonolux_core::{lighting::LightingConfig, logging::LogConfig, loudness::LoudnessConfig};
use std::fs;
use std::path::PathBuf;

/// User configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
    /// Window X position
    pub window_x: i32,
    /// Window Y position
    pub window_y: i32,
    /// Target frame rate (FPS); `None` leaves the loop uncapped
    pub target_fps: Option<f32>,

    /// Music track to play (WAV)
    pub music_path: PathBuf,
    /// Wood color texture for the ground plane
    pub wood_color_path: PathBuf,
    /// Wood normal map for the ground plane
    pub wood_normal_path: PathBuf,

    /// Output device name override; `None` uses the default device
    pub audio_device: Option<String>,
    /// GPU adapter name override; `None` auto-selects
    pub preferred_gpu: Option<String>,

    /// Animation angle advance per second
    pub animation_rate: f32,
    /// Loudness estimator tuning
    pub loudness: LoudnessConfig,
    /// Reactive lighting tuning
    pub lighting: LightingConfig,
    /// Logging settings
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 800,
            window_x: 10,
            window_y: 10,
            target_fps: Some(60.0),
            music_path: PathBuf::from("audio/noisestorm_crab.wav"),
            wood_color_path: PathBuf::from("images/wood_maps/wood_color.png"),
            wood_normal_path: PathBuf::from("images/wood_maps/wood_normal.png"),
            audio_device: None,
            preferred_gpu: None,
            animation_rate: sonolux_core::clock::DEFAULT_RATE,
            loudness: LoudnessConfig::default(),
            lighting: LightingConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("sonolux");
            p.push("config.toml");
            p
        })
    }

    /// Load configuration from disk, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| {
                if path.exists() {
                    fs::read_to_string(&path).ok()
                } else {
                    None
                }
            })
            .and_then(|content| match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    eprintln!("Warning: ignoring invalid config file: {}", e);
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.window_width, 800);
        assert_eq!(config.window_height, 800);
        assert_eq!(config.animation_rate, 60.0);
        assert!(config.audio_device.is_none());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.window_width = 1280;
        config.audio_device = Some("Speakers".to_string());
        config.lighting.specular_gain = 7.5;
        config.loudness.divisor = 4096.0;

        let text = toml::to_string_pretty(&config).unwrap();
        let loaded: AppConfig = toml::from_str(&text).unwrap();

        assert_eq!(loaded.window_width, 1280);
        assert_eq!(loaded.audio_device.as_deref(), Some("Speakers"));
        assert_eq!(loaded.lighting.specular_gain, 7.5);
        assert_eq!(loaded.loudness.divisor, 4096.0);
    }

    #[test]
    fn test_partial_config_takes_defaults() {
        let loaded: AppConfig = toml::from_str("window_width = 1024\n").unwrap();
        assert_eq!(loaded.window_width, 1024);
        assert_eq!(loaded.window_height, 800);
        assert_eq!(loaded.lighting.exponent, 2.5);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let loaded: AppConfig =
            toml::from_str("window_width = 640\nsome_future_option = true\n").unwrap();
        assert_eq!(loaded.window_width, 640);
    }
}
