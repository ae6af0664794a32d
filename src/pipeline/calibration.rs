//! Pixel-to-physical calibration.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Physical length of one major ruler step, in micrometres.
pub const MAJOR_STEP_UM: f64 = 1000.0;

/// Minor ruler divisions per major step.
pub const MINOR_DIVISIONS: usize = 10;

/// Smallest accepted pixel pitch. Keeps a major ruler step under 100 000 px.
pub const MIN_PIXEL_SIZE_UM: f64 = 0.01;

/// Largest accepted shift of the optical zero from the frame center, in pixels.
pub const MAX_ZERO_OFFSET_PX: f64 = 1.0e6;

/// Calibration of a camera/optics setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParams {
    /// Sensor pixel pitch in micrometres.
    pub pixel_size_um: f64,
    /// Percentage below peak intensity kept for moment computation.
    pub threshold_percent: f64,
    /// Horizontal offset of the optical zero from the frame center (µm).
    pub center_offset_x_um: f64,
    /// Vertical offset of the optical zero from the frame center (µm).
    pub center_offset_y_um: f64,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            pixel_size_um: 5.86,
            threshold_percent: 15.0,
            center_offset_x_um: 0.0,
            center_offset_y_um: 0.0,
        }
    }
}

impl CalibrationParams {
    /// Creates parameters with a given pixel size and threshold, zero offsets.
    pub fn new(pixel_size_um: f64, threshold_percent: f64) -> Self {
        Self {
            pixel_size_um,
            threshold_percent,
            ..Default::default()
        }
    }

    /// Sets the optical-zero offsets.
    pub fn with_center_offset(mut self, x_um: f64, y_um: f64) -> Self {
        self.center_offset_x_um = x_um;
        self.center_offset_y_um = y_um;
        self
    }

    /// Validates the calibration parameters.
    ///
    /// The pixel pitch must be finite and at least [`MIN_PIXEL_SIZE_UM`],
    /// and each offset must move the optical zero by no more than
    /// [`MAX_ZERO_OFFSET_PX`] pixels.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pixel_size_um.is_finite() && self.pixel_size_um >= MIN_PIXEL_SIZE_UM) {
            return Err(ConfigError::InvalidPixelSize(self.pixel_size_um));
        }
        if !(0.0..=100.0).contains(&self.threshold_percent) {
            return Err(ConfigError::InvalidThreshold(self.threshold_percent));
        }
        for offset in [self.center_offset_x_um, self.center_offset_y_um] {
            if !offset.is_finite() || (offset / self.pixel_size_um).abs() > MAX_ZERO_OFFSET_PX {
                return Err(ConfigError::InvalidOffset);
            }
        }
        Ok(())
    }

    /// Pixel shift of the optical zero: `-round(offset / pixel_size)` per axis.
    pub fn zero_offset_px(&self) -> (i64, i64) {
        (
            -(self.center_offset_x_um / self.pixel_size_um).round() as i64,
            -(self.center_offset_y_um / self.pixel_size_um).round() as i64,
        )
    }

    /// Optical zero in pixel coordinates for a frame of the given size.
    pub fn optical_center_px(&self, width: usize, height: usize) -> (f64, f64) {
        let (zx, zy) = self.zero_offset_px();
        (width as f64 / 2.0 + zx as f64, height as f64 / 2.0 + zy as f64)
    }

    /// Pixels per major ruler step, `floor(1000 / pixel_size)`, at least 1.
    pub fn major_step_px(&self) -> usize {
        ((MAJOR_STEP_UM / self.pixel_size_um).floor() as usize).max(1)
    }

    /// Pixels per minor ruler step; 0 when the major step is too short to subdivide.
    pub fn minor_step_px(&self) -> usize {
        self.major_step_px() / MINOR_DIVISIONS
    }

    /// Converts a pixel length to micrometres.
    #[inline]
    pub fn px_to_um(&self, px: f64) -> f64 {
        px * self.pixel_size_um
    }
}
