//! Beam measurement stages.
//!
//! Each stage takes explicit inputs and returns a fresh value:
//!
//! ```text
//! BgrImage ─ Preprocessor ─┬─ ThresholdMap ─ CentroidLocator ─ Centroid
//!                          └─ smoothed ──────┬─ BeamExtentScanner ─ BeamExtent
//!                                            └─ VolumeIntegrator ── volume
//! ```
//!
//! No stage renders anything; see `overlay` for that.

mod beam;
mod centroid;
mod extent;
mod surface;
mod threshold;
mod volume;

pub use beam::{Metrics, PhysicalMetrics};
pub use centroid::{Centroid, CentroidLocator, Moments};
pub use extent::{BeamExtent, BeamExtentScanner, EXTENT_CUTOFF};
pub use surface::{surface_grid, SURFACE_GRID_SIZE};
pub use threshold::{
    cutoff_for, Preprocessed, Preprocessor, ThresholdMap, GAUSSIAN_KSIZE, MEDIAN_KSIZE,
};
pub use volume::VolumeIntegrator;

use thiserror::Error;

/// Errors raised by the measurement stages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The frame cannot be analyzed (zero area or malformed).
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}
