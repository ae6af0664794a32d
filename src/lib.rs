//! Beam Profiler Library
//!
//! Laser beam-profile diagnostics from single camera frames: centroid,
//! spatial extent and integrated intensity, plus a calibrated diagnostic
//! overlay.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! capture → pipeline ─┬─ analysis (preprocess → centroid → extent → volume)
//!                     └─ overlay  (false color, crosshair, cuts, ruler)
//! ```
//!
//! `capture` and `metrics` sit outside the per-frame core; nothing in
//! `analysis` or `overlay` depends on a device or on frame cadence.
//!
//! # Example
//!
//! ```no_run
//! use beam_profiler::{
//!     capture::{DeviceSelector, FrameSource, MockSource, StreamConfig},
//!     pipeline::{BeamPipeline, CalibrationParams},
//!     overlay::OverlayConfig,
//! };
//! use std::time::Duration;
//!
//! let mut source = MockSource::new();
//! source
//!     .start_stream(&DeviceSelector::default(), &StreamConfig::default())
//!     .unwrap();
//!
//! let pipeline = BeamPipeline::new(CalibrationParams::new(5.86, 15.0), OverlayConfig::default())
//!     .unwrap();
//! let frame = source.next_frame(Duration::from_millis(100)).unwrap();
//! let (overlay, metrics) = pipeline.process(&frame).unwrap();
//!
//! println!("centroid = ({}, {})", metrics.centroid_x_px(), metrics.centroid_y_px());
//! assert_eq!(overlay.width(), frame.width() as usize);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod capture;
pub mod config;
pub mod metrics;
pub mod overlay;
pub mod pipeline;
pub mod raster;

// Re-export commonly used types at crate root
pub use analysis::{BeamExtent, Centroid, Metrics, PhysicalMetrics};
pub use capture::{Frame, FrameSource, MockSource, PropertyStore};
pub use config::FileConfig;
pub use overlay::{Canvas, OverlayConfig, OverlayRenderer};
pub use pipeline::{BeamPipeline, CalibrationParams, FrameReport, PipelineError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
