//! Serializable per-frame output.

use super::calibration::CalibrationParams;
use crate::analysis::{Metrics, PhysicalMetrics};
use crate::capture::Frame;
use crate::raster::BgrImage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the CLI prints or logs for each processed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Sequence number of the source frame.
    pub sequence: u64,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel measurements.
    pub metrics: Metrics,
    /// `None` when no beam was found.
    pub physical: Option<PhysicalMetrics>,
    /// BLAKE3 of the rendered overlay, hex encoded.
    pub overlay_digest: String,
    /// When the frame was processed.
    pub processed_at: DateTime<Utc>,
}

impl FrameReport {
    /// Builds a report for `frame`, fingerprinting `output`.
    pub fn new(
        frame: &Frame,
        metrics: Metrics,
        calibration: &CalibrationParams,
        output: &BgrImage,
    ) -> Self {
        let physical = metrics.to_physical(
            calibration,
            frame.width() as usize,
            frame.height() as usize,
        );
        Self {
            sequence: frame.sequence(),
            width: frame.width(),
            height: frame.height(),
            metrics,
            physical,
            overlay_digest: output.digest().to_hex().to_string(),
            processed_at: Utc::now(),
        }
    }

    /// One-line JSON encoding.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
