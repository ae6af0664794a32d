//! Per-frame beam measurements.

use super::centroid::Centroid;
use super::extent::BeamExtent;
use crate::pipeline::CalibrationParams;
use serde::{Deserialize, Serialize};

/// Measurements of one frame.
///
/// Every field is zero when no beam was found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Beam centroid, or `Absent`.
    pub centroid: Centroid,
    /// `width / 2 - centroid_x`.
    pub dist_x_px: f64,
    /// `height / 2 - centroid_y`.
    pub dist_y_px: f64,
    /// Beam rectangle width in pixels.
    pub width_px: usize,
    /// Beam rectangle height in pixels.
    pub height_px: usize,
    /// Smoothed intensity summed over the beam rectangle.
    pub volume: u64,
}

impl Metrics {
    /// Metrics for a frame without a beam.
    pub fn empty() -> Self {
        Self {
            centroid: Centroid::Absent,
            dist_x_px: 0.0,
            dist_y_px: 0.0,
            width_px: 0,
            height_px: 0,
            volume: 0,
        }
    }

    /// Assembles the stage outputs for a `frame_width`×`frame_height` frame.
    pub fn from_stages(
        frame_width: usize,
        frame_height: usize,
        centroid: Centroid,
        extent: &BeamExtent,
        volume: u64,
    ) -> Self {
        match centroid.position() {
            None => Self::empty(),
            Some((x, y)) => Self {
                centroid,
                dist_x_px: frame_width as f64 / 2.0 - x as f64,
                dist_y_px: frame_height as f64 / 2.0 - y as f64,
                width_px: extent.width,
                height_px: extent.height,
                volume,
            },
        }
    }

    /// Returns true if a centroid was found.
    #[inline]
    pub fn beam_found(&self) -> bool {
        self.centroid.is_present()
    }

    /// Centroid column, 0 when absent.
    #[inline]
    pub fn centroid_x_px(&self) -> usize {
        self.centroid.position().map_or(0, |(x, _)| x)
    }

    /// Centroid row, 0 when absent.
    #[inline]
    pub fn centroid_y_px(&self) -> usize {
        self.centroid.position().map_or(0, |(_, y)| y)
    }

    /// Expresses the measurements in micrometres against the ruler axes.
    ///
    /// Positions are relative to the calibrated optical zero and follow the
    /// ruler sign convention: x grows leftward, y grows downward.
    pub fn to_physical(
        &self,
        calibration: &CalibrationParams,
        frame_width: usize,
        frame_height: usize,
    ) -> Option<PhysicalMetrics> {
        let (x, y) = self.centroid.position()?;
        let (ox, oy) = calibration.optical_center_px(frame_width, frame_height);
        Some(PhysicalMetrics {
            centroid_x_um: calibration.px_to_um(ox - x as f64),
            centroid_y_um: calibration.px_to_um(y as f64 - oy),
            width_um: calibration.px_to_um(self.width_px as f64),
            height_um: calibration.px_to_um(self.height_px as f64),
        })
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::empty()
    }
}

/// Beam measurements converted to micrometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalMetrics {
    /// Centroid x relative to the optical zero; grows leftward.
    pub centroid_x_um: f64,
    /// Centroid y relative to the optical zero; grows downward.
    pub centroid_y_um: f64,
    /// Beam width in micrometres.
    pub width_um: f64,
    /// Beam height in micrometres.
    pub height_um: f64,
}
