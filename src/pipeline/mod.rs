//! Frame-to-overlay pipeline.
//!
//! [`BeamPipeline`] chains the analysis stages and the overlay renderer
//! for one [`CalibrationParams`]. Frames in, `(overlay, Metrics)` out.

mod calibration;
mod processor;
mod report;

pub use calibration::{
    CalibrationParams, MAJOR_STEP_UM, MAX_ZERO_OFFSET_PX, MINOR_DIVISIONS, MIN_PIXEL_SIZE_UM,
};
pub use processor::{BeamPipeline, Measurement};
pub use report::FrameReport;

use crate::analysis::AnalysisError;
use crate::capture::FrameError;
use thiserror::Error;

/// Errors from processing a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The frame had zero area or a malformed buffer. The pipeline stays usable.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

impl From<FrameError> for PipelineError {
    fn from(err: FrameError) -> Self {
        PipelineError::InvalidFrame(err.to_string())
    }
}

impl From<AnalysisError> for PipelineError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidFrame(reason) => PipelineError::InvalidFrame(reason),
        }
    }
}
