use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use facecam_core::detection::infrastructure::model_resolver::ModelSource;
use facecam_core::session::loop_config::LoopConfig;
use facecam_core::shared::constants::{
    DEFAULT_MODEL_DIR, DEFAULT_REFRESH_HZ, DEFAULT_START_DELAY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    System,
    Dark,
    Light,
}

/// Persisted desktop settings. Missing fields fall back to defaults so
/// older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub camera_index: u32,
    /// Minimum face confidence, in percent.
    pub confidence: u32,
    pub start_delay_ms: u64,
    pub refresh_hz: u32,
    pub model_dir: PathBuf,
    pub model_url: Option<String>,
    pub appearance: Appearance,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_index: 0,
            confidence: 50,
            start_delay_ms: DEFAULT_START_DELAY.as_millis() as u64,
            refresh_hz: DEFAULT_REFRESH_HZ,
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            model_url: None,
            appearance: Appearance::System,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceCam").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .map(|json| Self::from_json(&json))
            .unwrap_or_default()
    }

    /// Unreadable content falls back to defaults.
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable settings: {e}");
            Self::default()
        })
    }

    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(&path, json) {
                    log::warn!("Failed to save settings to {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("Failed to serialize settings: {e}"),
        }
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            min_confidence: self.confidence.min(100) as f64 / 100.0,
            start_delay: Duration::from_millis(self.start_delay_ms),
            refresh_hz: self.refresh_hz.max(1),
            ..LoopConfig::default()
        }
    }

    pub fn model_source(&self) -> ModelSource {
        ModelSource {
            asset_dir: Some(self.model_dir.clone()),
            download_url: self.model_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_map_to_default_loop_config() {
        assert_eq!(Settings::default().loop_config(), LoopConfig::default());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings = Settings::from_json(r#"{ "camera_index": 2, "appearance": "light" }"#);
        assert_eq!(settings.camera_index, 2);
        assert_eq!(settings.appearance, Appearance::Light);
        assert_eq!(settings.confidence, 50);
        assert_eq!(settings.start_delay_ms, 2000);
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        assert_eq!(Settings::from_json("not json"), Settings::default());
    }

    #[test]
    fn test_confidence_percent_is_clamped() {
        let settings = Settings {
            confidence: 250,
            ..Settings::default()
        };
        assert_eq!(settings.loop_config().min_confidence, 1.0);
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        let settings = Settings {
            model_url: Some("https://example.com/face.onnx".into()),
            ..Settings::default()
        };
        fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();
        let loaded = Settings::from_json(&fs::read_to_string(&path).unwrap());
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_model_source_uses_model_dir() {
        let source = Settings::default().model_source();
        assert_eq!(source.asset_dir, Some(PathBuf::from("models")));
        assert!(source.download_url.is_none());
    }
}
