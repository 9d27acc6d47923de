use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pipeline configuration, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base URL of the transform service.
    pub service_url: String,
    /// Tick interval in milliseconds. Tied to the display rate, not the
    /// transform round-trip time.
    pub tick_interval_ms: u64,
    /// JPEG quality for transmitted frames (1-100).
    pub jpeg_quality: u8,
    /// Downscale transmitted frames wider than this. `None` sends frames
    /// at capture resolution.
    pub transmit_max_width: Option<u32>,
    /// Timeout for one transform round trip, in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:8000".to_string(),
            tick_interval_ms: 33,
            jpeg_quality: 85,
            transmit_max_width: Some(1280),
            request_timeout_ms: 10_000,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file, returning defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    }

    /// Save configuration to disk atomically (write .tmp then rename).
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json).map_err(|e| e.to_string())?;
        std::fs::rename(&tmp_path, path).map_err(|e| e.to_string())?;

        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sensible() {
        let config = PipelineConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(33));
        assert!((1..=100).contains(&config.jpeg_quality));
        assert!(config.service_url.starts_with("http://"));
    }

    #[test]
    fn round_trips_through_json() {
        let config = PipelineConfig {
            service_url: "http://10.0.0.5:8000".to_string(),
            tick_interval_ms: 66,
            jpeg_quality: 70,
            transmit_max_width: None,
            request_timeout_ms: 5000,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"service_url": "http://box:8000"}"#).unwrap();
        assert_eq!(config.service_url, "http://box:8000");
        assert_eq!(config.jpeg_quality, PipelineConfig::default().jpeg_quality);
    }

    #[test]
    fn load_returns_defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");

        let config = PipelineConfig {
            jpeg_quality: 60,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = PipelineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        // No stray tmp file left behind
        assert!(!path.with_extension("json.tmp").exists());
    }
}
