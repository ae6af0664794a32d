//! Stream configuration.
//!
//! Property defaults are applied before the user's own values so that a
//! fresh stream always starts from a known device state.

use super::property::PropertyValue;
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Identifies a device by model and/or serial number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSelector {
    /// Device model, matched exactly.
    #[serde(default)]
    pub model: Option<String>,
    /// Device serial number, matched exactly.
    #[serde(default)]
    pub serial_number: Option<String>,
}

impl DeviceSelector {
    /// Selects by model name.
    pub fn model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            serial_number: None,
        }
    }

    /// True if every populated field matches.
    pub fn matches(&self, model: &str, serial_number: &str) -> bool {
        self.model.as_deref().map_or(true, |m| m == model)
            && self.serial_number.as_deref().map_or(true, |s| s == serial_number)
    }
}

/// Geometry and brightness of the synthetic beam produced by `MockSource`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Beam center column.
    pub beam_x: f64,
    /// Beam center row.
    pub beam_y: f64,
    /// Gaussian 1/e² radius in pixels.
    pub beam_radius_px: f64,
    /// Peak intensity at the reference exposure.
    pub peak: f64,
    /// Uniform background level.
    pub background: f64,
    /// Speckle noise amplitude (peak-to-peak).
    pub noise: f64,
    /// RNG seed; frame `n` uses `seed + n`.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            beam_x: 320.0,
            beam_y: 240.0,
            beam_radius_px: 60.0,
            peak: 230.0,
            background: 8.0,
            noise: 12.0,
            seed: 0,
        }
    }
}

/// Configuration for an acquisition stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Which device to open.
    pub device: DeviceSelector,
    /// Maximum wait for one frame, in milliseconds.
    pub frame_timeout_ms: u64,
    /// Property values applied on every stream start; failures are logged.
    pub default_properties: BTreeMap<String, PropertyValue>,
    /// Caller-supplied values applied after the defaults; failures are logged.
    pub property_overrides: BTreeMap<String, PropertyValue>,
    /// Properties reported back to the caller after start.
    pub user_properties: Vec<String>,
    /// Synthetic source settings.
    pub synthetic: SyntheticConfig,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            device: DeviceSelector::default(),
            frame_timeout_ms: 1000,
            default_properties: BTreeMap::new(),
            property_overrides: BTreeMap::new(),
            user_properties: vec!["ExposureTime".to_string(), "Gain".to_string()],
            synthetic: SyntheticConfig::default(),
        }
    }
}

impl StreamConfig {
    /// Frame timeout as a `Duration`.
    pub fn frame_timeout(&self) -> Duration {
        Duration::from_millis(self.frame_timeout_ms)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        let s = &self.synthetic;
        if s.width == 0 || s.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if !(s.beam_radius_px.is_finite() && s.beam_radius_px > 0.0) {
            return Err(ConfigError::InvalidBeam(format!(
                "radius {} must be positive",
                s.beam_radius_px
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(StreamConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_invalid() {
        let mut config = StreamConfig::default();
        config.synthetic.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_selector_matching() {
        let any = DeviceSelector::default();
        assert!(any.matches("A", "1"));

        let by_model = DeviceSelector::model("STC_CMC4MPOE");
        assert!(by_model.matches("STC_CMC4MPOE", "15D2184"));
        assert!(!by_model.matches("Other", "15D2184"));
    }

    #[test]
    fn test_properties_from_toml() {
        let config: StreamConfig = toml::from_str(
            r#"
            user_properties = ["ExposureTime"]
            [default_properties]
            ExposureTime = 5000
            Gain = 1.5
            "#,
        )
        .unwrap();
        assert_eq!(
            config.default_properties["ExposureTime"],
            PropertyValue::Int(5000)
        );
        assert_eq!(config.default_properties["Gain"], PropertyValue::Float(1.5));
        assert_eq!(config.frame_timeout_ms, 1000);
    }
}
