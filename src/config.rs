use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::camera::{CameraConfig, Viewport};
use crate::classify::ClassifierConfig;
use crate::core::SamplerConfig;
use crate::projector::LABEL_Z_OFFSET;

/// Runtime settings, every field optional in the JSON form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub label_z_offset: f64,
    pub camera: CameraConfig,
    pub viewport: Viewport,
    pub sampler: SamplerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            label_z_offset: LABEL_Z_OFFSET,
            camera: CameraConfig::default(),
            viewport: Viewport::default(),
            sampler: SamplerConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid configuration")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        Self::from_json_str(&text).context(format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        assert_eq!(AppConfig::from_json_str("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_overrides() {
        let config = AppConfig::from_json_str(
            r#"{
                "classifier": { "space_layer": "Rooms" },
                "label_z_offset": 2.5,
                "sampler": { "max_attempts": 10 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.classifier.space_layer, "Rooms");
        assert_eq!(config.classifier.boundary_layer, "Occ");
        assert_eq!(config.label_z_offset, 2.5);
        assert_eq!(config.sampler.max_attempts, 10);
        assert_eq!(config.sampler.min_attempts, SamplerConfig::default().min_attempts);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(AppConfig::from_json_str(r#"{"label_z_offset": "high"}"#).is_err());
        assert!(AppConfig::from_json_file("/nonexistent/config.json").is_err());
    }
}
