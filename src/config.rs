//! Configuration file handling.
//!
//! One TOML document configures calibration, overlay styling, the
//! acquisition stream and CLI output. Every section is optional.

use crate::capture::StreamConfig;
use crate::overlay::OverlayConfig;
use crate::pipeline::CalibrationParams;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Synthetic frame width or height is zero.
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    /// Pixel pitch is not finite or below the minimum.
    #[error("pixel size {0} um must be finite and at least 0.01")]
    InvalidPixelSize(f64),
    /// Threshold percentage outside `0..=100`.
    #[error("threshold {0}% must lie within 0..=100")]
    InvalidThreshold(f64),
    /// Optical zero offset is not finite or too far out.
    #[error("center offset must be finite and within 1e6 pixels")]
    InvalidOffset,
    /// Frame timeout is zero.
    #[error("frame timeout must be non-zero")]
    InvalidTimeout,
    /// Synthetic beam parameters are unusable.
    #[error("invalid synthetic beam: {0}")]
    InvalidBeam(String),
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Pixel size, threshold and optical zero.
    #[serde(default)]
    pub calibration: CalibrationParams,
    /// Overlay styling.
    #[serde(default)]
    pub overlay: OverlayConfig,
    /// Acquisition settings.
    #[serde(default)]
    pub stream: StreamConfig,
    /// Frame count and exporter settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Run continuously (true) or process fixed number of frames (false).
    pub continuous: bool,
    /// Number of frames to process if not continuous.
    pub frame_count: u32,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            frame_count: 100,
            metrics_port: 9090,
        }
    }
}

impl FileConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calibration.validate()?;
        self.stream.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        assert_eq!(config.calibration.pixel_size_um, 5.86);
        assert_eq!(config.output.frame_count, 100);
    }

    #[test]
    fn test_sections_parsed() {
        let config = FileConfig::from_toml(
            r#"
            [calibration]
            pixel_size_um = 3.45
            threshold_percent = 30
            center_offset_x_um = -200
            center_offset_y_um = -200.0

            [overlay]
            show_info_panel = true

            [output]
            frame_count = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.calibration.pixel_size_um, 3.45);
        assert_eq!(config.calibration.threshold_percent, 30.0);
        assert_eq!(config.calibration.center_offset_x_um, -200.0);
        assert!(config.overlay.show_info_panel);
        assert_eq!(config.output.frame_count, 5);
        assert_eq!(config.output.metrics_port, 9090);
    }

    #[test]
    fn test_invalid_calibration_rejected() {
        let err = FileConfig::from_toml("[calibration]\npixel_size_um = 0.0\n").unwrap_err();
        assert_eq!(err, ConfigError::InvalidPixelSize(0.0));
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beam.toml");
        std::fs::write(&path, "[calibration]\nthreshold_percent = 5\n").unwrap();
        let config = FileConfig::from_file(&path).unwrap();
        assert_eq!(config.calibration.threshold_percent, 5.0);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            FileConfig::from_file("/nonexistent/beam.toml"),
            Err(ConfigError::FileReadError(_))
        ));
    }
}
